use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Cart and listing summary carried next to a response payload.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, Default, PartialEq, Eq)]
pub struct Meta {
    pub total: Option<i64>,
    pub count: Option<i64>,
}

impl Meta {
    pub fn count(count: usize) -> Self {
        Self {
            total: None,
            count: Some(count as i64),
        }
    }

    pub fn totals(total: i64, count: i64) -> Self {
        Self {
            total: Some(total),
            count: Some(count),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub message: String,
    pub data: Option<T>,
    pub meta: Option<Meta>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T, meta: Option<Meta>) -> Self {
        Self {
            message: message.into(),
            data: Some(data),
            meta,
        }
    }

    pub fn failure(message: impl Into<String>, data: T) -> Self {
        Self {
            message: message.into(),
            data: Some(data),
            meta: Some(Meta::empty()),
        }
    }
}
