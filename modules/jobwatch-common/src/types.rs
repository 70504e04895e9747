use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Rendered in place of a missing or unparsable publication date.
pub const DATE_NOT_AVAILABLE: &str = "N/A";

/// Identifiers of jobs that have already been delivered. Ordered so the
/// persisted file is stable between writes.
pub type SeenJobSet = BTreeSet<String>;

/// One listing from a source feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedEntry {
    /// Feed-supplied id, or the link when the feed has none.
    pub id: String,
    pub title: String,
    pub link: String,
    pub published_at: Option<DateTime<Utc>>,
    /// Free text, may contain markup.
    pub summary: Option<String>,
}

impl FeedEntry {
    /// Publication date as `05 Mar 2025`, or `N/A`.
    pub fn published_display(&self) -> String {
        self.published_at
            .map(|dt| dt.format("%d %b %Y").to_string())
            .unwrap_or_else(|| DATE_NOT_AVAILABLE.to_string())
    }
}

/// Semi-structured fields recovered from an entry summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedDetails {
    pub employer: Option<String>,
    pub specialty: Option<String>,
    pub salary: Option<String>,
    pub location: Option<String>,
}

impl ExtractedDetails {
    pub fn is_empty(&self) -> bool {
        self.employer.is_none()
            && self.specialty.is_none()
            && self.salary.is_none()
            && self.location.is_none()
    }
}
