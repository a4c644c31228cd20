//! Read-only analytics payloads rendered by the dashboards.

use serde::{Deserialize, Serialize};

use crate::document::DocumentCategory;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_documents: u64,
    pub questions_this_week: u64,
    pub avg_quiz_score: f64,
    pub study_streak: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documents_trend: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub questions_trend: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatedCount {
    pub date: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMinutes {
    pub document_name: String,
    pub minutes: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityData {
    pub questions_over_time: Vec<DatedCount>,
    pub questions_by_category: Vec<CategoryCount>,
    pub time_per_document: Vec<DocumentMinutes>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeakArea {
    pub category: DocumentCategory,
    pub accuracy: f64,
    pub recommendation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_name: Option<String>,
}

/// One cell of the study-calendar heatmap; `level` is the 0..=4 intensity
/// bucket the backend precomputes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyCalendarDay {
    pub date: String,
    pub count: u64,
    pub level: u8,
}
