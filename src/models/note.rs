use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::UserSummary;

/// Note as stored: owner and shared-with entries are user ids.
/// The owner is set at creation and never changes.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub title: String,
    pub text: String,
    /// Owner user id
    pub user: String,
    pub is_private: bool,
    pub shared_with: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Note with owner and shared-with identities expanded to summary fields,
/// returned by the listing endpoints.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteRecord {
    pub id: String,
    pub title: String,
    pub text: String,
    pub user: UserSummary,
    pub is_private: bool,
    pub shared_with: Vec<UserSummary>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNoteRequest {
    pub title: Option<String>,
    pub text: Option<String>,
    pub is_private: Option<bool>,
    pub shared_with: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNoteRequest {
    pub title: Option<String>,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivacyRequest {
    pub is_private: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareRequest {
    pub shared_with: Vec<String>,
}

/// Per-calendar-month counters for one owner's notes. Only months with at
/// least one created note appear in the analytics response.
#[derive(Debug, Clone, Serialize)]
pub struct MonthlyCounts {
    /// Three-letter month label ("Jan".."Dec")
    pub month: &'static str,
    pub created: i64,
    pub shared: i64,
    pub private: i64,
    pub public: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteAnalytics {
    pub total_created: i64,
    pub shared_notes: i64,
    pub private_notes: i64,
    pub public_notes: i64,
    pub monthly_data: Vec<MonthlyCounts>,
}

const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Map a 1-based month number to its fixed three-letter label
pub fn month_label(month: u32) -> &'static str {
    MONTH_LABELS[(month.saturating_sub(1) as usize).min(11)]
}
