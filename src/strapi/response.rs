//! Strapi response envelopes

use serde::{Deserialize, Serialize};

/// `{ "data": [...], "meta": { "pagination": {...} } }`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CollectionResponse<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub meta: Meta,
}

/// `{ "data": {...} }`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SingleResponse<T> {
    pub data: Option<T>,
}

/// Request body wrapper for create / update calls
#[derive(Debug, Clone, Serialize)]
pub struct Payload<'a, T> {
    pub data: &'a T,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Meta {
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    #[serde(rename = "pageSize")]
    pub page_size: u32,
    #[serde(rename = "pageCount")]
    pub page_count: u32,
    pub total: u64,
}

impl<T> CollectionResponse<T> {
    /// Whether more pages follow the current one
    pub fn has_more(&self) -> bool {
        match self.meta.pagination {
            Some(p) => p.page < p.page_count,
            None => false,
        }
    }

    /// Total item count reported by the server, or the page length
    pub fn total(&self) -> u64 {
        self.meta
            .pagination
            .map(|p| p.total)
            .unwrap_or(self.data.len() as u64)
    }
}

/// Error body returned with non-2xx responses
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorDetail {
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub message: String,
}

/// Minimal projection used when only identifiers are needed
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Identity {
    pub id: u64,
    #[serde(rename = "documentId", default)]
    pub document_id: Option<String>,
}
