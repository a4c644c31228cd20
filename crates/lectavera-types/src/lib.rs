//! Shared domain types for the Lectavera study app client.
//!
//! Everything here is plain data: serde models exchanged with the backend
//! over the REST API and the study-session WebSocket. No I/O lives in this
//! crate.

pub mod analytics;
pub mod document;
pub mod message;
pub mod quiz;
pub mod study;
pub mod user;

pub use analytics::{ActivityData, DashboardStats, StudyCalendarDay, WeakArea};
pub use document::{Document, DocumentCategory, DocumentStatus, DocumentsPage};
pub use message::{Citation, CitationSource, Message, Role, StudyMode, Verdict};
pub use quiz::{
    Difficulty, Quiz, QuizAnswer, QuizGenerateRequest, QuizHistoryEntry, QuizQuestion,
    QuizQuestionWithAnswer, QuizResult, QuizStatus, QuizSubmitRequest,
};
pub use study::{SessionWithMessages, StudySession};
pub use user::{AuthResponse, Tokens, User, UserPreferences};
