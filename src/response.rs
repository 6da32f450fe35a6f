//! The JSON envelope every handler answers with: `{ message, data, meta }`.

use serde::Serialize;
use utoipa::ToSchema;

/// Side information about `data`. Only the fields that apply are serialized.
#[derive(Debug, Default, Serialize, ToSchema, Clone, PartialEq)]
pub struct Meta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<i64>,
    /// Catalog responses only: true when the built-in sample catalog was served.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<bool>,
}

impl Meta {
    /// From the `(page, per_page, total)` triple that
    /// [`Pagination::slice`](crate::routes::params::Pagination::slice) returns.
    pub fn paged((page, per_page, total): (i64, i64, i64)) -> Self {
        Self {
            page: Some(page),
            per_page: Some(per_page),
            total: Some(total),
            ..Self::default()
        }
    }

    pub fn catalog(fallback: bool) -> Self {
        Self {
            fallback: Some(fallback),
            ..Self::default()
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

#[derive(Debug, Serialize, ToSchema)]
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

    /// Catalog payload tagged with whether it came from the sample set.
    pub fn catalog(data: T, fallback: bool) -> Self {
        Self::success("OK", data, Some(Meta::catalog(fallback)))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn unset_meta_fields_are_left_out() {
        let body = ApiResponse::catalog(vec![1, 2], true);
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({ "message": "OK", "data": [1, 2], "meta": { "fallback": true } })
        );

        let paged = serde_json::to_value(Meta::paged((2, 20, 41))).unwrap();
        assert_eq!(paged, json!({ "page": 2, "per_page": 20, "total": 41 }));
    }
}
