//! Document library endpoints. Upload is multipart and handled elsewhere in
//! the app; this client covers the metadata surface.

use lectavera_types::{Document, DocumentCategory, DocumentsPage};
use serde::Serialize;

use crate::{ApiClient, Result};

#[derive(Debug, Clone, Default, Serialize)]
pub struct DocumentFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<DocumentCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DocumentUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<DocumentCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_archived: Option<bool>,
}

impl ApiClient {
    pub async fn list_documents(&self, filter: &DocumentFilter) -> Result<DocumentsPage> {
        self.send_json(self.http().get(self.endpoint("/documents")).query(filter))
            .await
    }

    pub async fn get_document(&self, id: &str) -> Result<Document> {
        self.send_json(self.http().get(self.endpoint(&format!("/documents/{id}"))))
            .await
    }

    pub async fn update_document(&self, id: &str, update: &DocumentUpdate) -> Result<Document> {
        self.send_json(
            self.http()
                .patch(self.endpoint(&format!("/documents/{id}")))
                .json(update),
        )
        .await
    }

    pub async fn archive_document(&self, id: &str) -> Result<Document> {
        self.update_document(
            id,
            &DocumentUpdate {
                is_archived: Some(true),
                ..DocumentUpdate::default()
            },
        )
        .await
    }

    pub async fn delete_document(&self, id: &str) -> Result<()> {
        self.send_empty(
            self.http()
                .delete(self.endpoint(&format!("/documents/{id}"))),
        )
        .await
    }
}
