//! Response DTOs.

use serde::{Deserialize, Serialize};

use admin_entity::user::User;
use admin_service::dict::DictWithItems;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

impl ApiResponse<MessageResponse> {
    /// Creates a successful response carrying only a message.
    pub fn message(message: impl Into<String>) -> Self {
        Self::ok(MessageResponse {
            message: message.into(),
        })
    }
}

/// Simple message response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Message text.
    pub message: String,
}

/// Outcome of a batch delete.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchDeleteResponse {
    /// Number of rows that were deleted.
    pub deleted: u64,
}

/// Outcome of a profile update.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileUpdateResponse {
    /// Message text.
    pub message: String,
    /// The saved account.
    pub user: User,
}

/// Every dictionary type with its items.
#[derive(Debug, Clone, Serialize)]
pub struct AllDictsResponse {
    /// Types ordered by id, each carrying its items.
    pub dicts: Vec<DictWithItems>,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status: `ok` or `degraded`.
    pub status: String,
    /// Server version.
    pub version: String,
    /// Database reachability.
    pub database: bool,
    /// Cache reachability.
    pub cache: bool,
}
