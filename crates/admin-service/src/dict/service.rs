//! Dictionary types and their items.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use admin_core::error::AppError;
use admin_core::id::IdAllocator;
use admin_core::result::AppResult;
use admin_core::types::pagination::{PageRequest, PageResponse};
use admin_core::types::{DictItemId, DictTypeId};
use admin_database::repositories::DictRepository;
use admin_entity::dict::{
    CreateDictItem, CreateDictType, DictItem, DictType, UpdateDictItem, UpdateDictType,
};

use crate::context::RequestContext;

/// A dictionary type together with its items.
#[derive(Debug, Clone, Serialize)]
pub struct DictWithItems {
    /// The type, serialized inline.
    #[serde(flatten)]
    pub dict: DictType,
    /// Its items in sort order.
    pub items: Vec<DictItem>,
}

/// Manages dictionaries.
#[derive(Debug, Clone)]
pub struct DictService {
    /// Dictionary repository.
    dict_repo: Arc<DictRepository>,
    /// ID allocator.
    ids: Arc<IdAllocator>,
}

impl DictService {
    /// Creates a new dictionary service.
    pub fn new(dict_repo: Arc<DictRepository>, ids: Arc<IdAllocator>) -> Self {
        Self { dict_repo, ids }
    }

    /// Lists dictionary types.
    pub async fn list_types(&self, page: &PageRequest) -> AppResult<PageResponse<DictType>> {
        self.dict_repo.list_types(&page.normalized()).await
    }

    /// Gets a dictionary type by ID.
    pub async fn get_type(&self, id: DictTypeId) -> AppResult<DictType> {
        self.dict_repo
            .find_type(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Dictionary {id} not found")))
    }

    /// Gets a dictionary type by code.
    pub async fn get_type_by_code(&self, code: &str) -> AppResult<DictType> {
        self.dict_repo
            .find_type_by_code(code)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Dictionary '{code}' not found")))
    }

    /// Creates a dictionary type.
    pub async fn create_type(&self, ctx: &RequestContext, req: CreateDictType) -> AppResult<DictType> {
        if req.name.trim().is_empty() || req.code.trim().is_empty() {
            return Err(AppError::validation("Dictionary name and code are required"));
        }
        let dict = req.into_row(DictTypeId::from(self.ids.next_id()?));
        let created = self.dict_repo.create_type(&dict).await?;
        info!(dict_id = %created.id, code = %created.code, actor = %ctx.user_id, "Dictionary created");
        Ok(created)
    }

    /// Applies a partial update to a dictionary type.
    pub async fn update_type(
        &self,
        ctx: &RequestContext,
        id: DictTypeId,
        req: UpdateDictType,
    ) -> AppResult<DictType> {
        if req.code.as_deref().is_some_and(|c| c.trim().is_empty()) {
            return Err(AppError::validation("Dictionary code cannot be empty"));
        }
        let mut dict = self.get_type(id).await?;
        req.apply(&mut dict);
        let saved = self.dict_repo.update_type(&dict).await?;
        info!(dict_id = %id, actor = %ctx.user_id, "Dictionary updated");
        Ok(saved)
    }

    /// Soft-deletes a dictionary type and all of its items.
    pub async fn delete_type(&self, ctx: &RequestContext, id: DictTypeId) -> AppResult<()> {
        self.dict_repo.delete_type(id).await?;
        info!(dict_id = %id, actor = %ctx.user_id, "Dictionary deleted");
        Ok(())
    }

    /// Items of the dictionary with `code`.
    pub async fn items_by_code(&self, code: &str) -> AppResult<Vec<DictItem>> {
        let dict = self.get_type_by_code(code).await?;
        self.dict_repo.items_of(dict.id).await
    }

    /// Every dictionary type with its items, for clients that load them all
    /// at once.
    pub async fn all_with_items(&self) -> AppResult<Vec<DictWithItems>> {
        let types = self.dict_repo.all_types().await?;
        let items = self.dict_repo.all_items().await?;
        Ok(attach_items(types, items))
    }

    /// Adds an item to the dictionary with `code`.
    pub async fn create_item(
        &self,
        ctx: &RequestContext,
        code: &str,
        req: CreateDictItem,
    ) -> AppResult<DictItem> {
        if req.label.trim().is_empty() {
            return Err(AppError::validation("Dictionary item label cannot be empty"));
        }
        let dict = self.get_type_by_code(code).await?;
        let item = req.into_row(DictItemId::from(self.ids.next_id()?), dict.id);
        let created = self.dict_repo.create_item(&item).await?;
        info!(item_id = %created.id, dict_id = %dict.id, actor = %ctx.user_id, "Dictionary item created");
        Ok(created)
    }

    /// Applies a partial update to an item.
    pub async fn update_item(
        &self,
        ctx: &RequestContext,
        id: DictItemId,
        req: UpdateDictItem,
    ) -> AppResult<DictItem> {
        let mut item = self
            .dict_repo
            .find_item(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Dictionary item {id} not found")))?;
        req.apply(&mut item);
        let saved = self.dict_repo.update_item(&item).await?;
        info!(item_id = %id, actor = %ctx.user_id, "Dictionary item updated");
        Ok(saved)
    }

    /// Soft-deletes an item.
    pub async fn delete_item(&self, ctx: &RequestContext, id: DictItemId) -> AppResult<()> {
        self.dict_repo.delete_item(id).await?;
        info!(item_id = %id, actor = %ctx.user_id, "Dictionary item deleted");
        Ok(())
    }
}

/// Pairs each type with its items, keeping the order of both inputs. Items
/// of unknown types are dropped.
fn attach_items(types: Vec<DictType>, items: Vec<DictItem>) -> Vec<DictWithItems> {
    let mut by_type: HashMap<DictTypeId, Vec<DictItem>> = HashMap::new();
    for item in items {
        by_type.entry(item.dict_type_id).or_default().push(item);
    }
    types
        .into_iter()
        .map(|dict| {
            let items = by_type.remove(&dict.id).unwrap_or_default();
            DictWithItems { dict, items }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use admin_entity::RecordStatus;

    use super::*;

    fn dict(id: i64, code: &str) -> DictType {
        DictType {
            id: DictTypeId(id),
            name: code.to_uppercase(),
            code: code.to_string(),
            status: RecordStatus::Enabled,
            description: String::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        }
    }

    fn item(id: i64, dict_type: i64, sort: i32) -> DictItem {
        DictItem {
            id: DictItemId(id),
            dict_type_id: DictTypeId(dict_type),
            label: format!("label-{id}"),
            value: id.to_string(),
            sort,
            status: RecordStatus::Enabled,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        }
    }

    #[test]
    fn test_items_attach_to_their_type_in_order() {
        let types = vec![dict(1, "gender"), dict(2, "status"), dict(3, "empty")];
        let items = vec![item(10, 1, 0), item(11, 1, 1), item(20, 2, 0), item(99, 42, 0)];

        let grouped = attach_items(types, items);

        let shape: Vec<(&str, Vec<i64>)> = grouped
            .iter()
            .map(|g| (g.dict.code.as_str(), g.items.iter().map(|i| i.id.0).collect()))
            .collect();
        assert_eq!(
            shape,
            vec![("gender", vec![10, 11]), ("status", vec![20]), ("empty", vec![])]
        );
    }

    #[test]
    fn test_dict_with_items_serializes_flat() {
        let grouped = attach_items(vec![dict(1, "gender")], vec![item(10, 1, 0)]);
        let json = serde_json::to_value(&grouped[0]).unwrap();
        assert_eq!(json["code"], "gender");
        assert_eq!(json["items"][0]["label"], "label-10");
        assert!(json.get("deleted_at").is_none());
    }
}
