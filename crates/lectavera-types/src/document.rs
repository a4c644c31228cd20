//! Uploaded document metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentCategory {
    Math,
    Science,
    History,
    Literature,
    ComputerScience,
    Engineering,
    Business,
    Medicine,
    Law,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentStatus {
    Processing,
    Ready,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub filename: String,
    pub category: DocumentCategory,
    #[serde(default)]
    pub tags: Vec<String>,
    pub page_count: u32,
    pub file_size: u64,
    pub status: DocumentStatus,
    #[serde(default)]
    pub is_archived: bool,
    pub uploaded_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
}

/// One page of the document listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentsPage {
    pub documents: Vec<Document>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
}
