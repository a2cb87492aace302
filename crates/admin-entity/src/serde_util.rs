//! Serde helpers shared by update payloads.

/// Distinguishes an absent field from an explicit `null`.
///
/// Absent deserializes to `None`, `null` to `Some(None)` and a value to
/// `Some(Some(v))`. Use together with `#[serde(default)]`.
pub mod double_option {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }

    pub fn serialize<T, S>(value: &Option<Option<T>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Serialize,
        S: Serializer,
    {
        match value {
            Some(inner) => inner.serialize(serializer),
            None => serializer.serialize_none(),
        }
    }
}

#[cfg(test)]
mod tests {
    use admin_core::types::OrganizationId;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Patch {
        #[serde(default, with = "super::double_option")]
        parent_id: Option<Option<OrganizationId>>,
    }

    #[test]
    fn test_absent_null_and_value_are_distinct() {
        let absent: Patch = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.parent_id, None);
        let null: Patch = serde_json::from_str(r#"{"parent_id": null}"#).unwrap();
        assert_eq!(null.parent_id, Some(None));
        let value: Patch = serde_json::from_str(r#"{"parent_id": "12"}"#).unwrap();
        assert_eq!(value.parent_id, Some(Some(OrganizationId(12))));
    }
}
