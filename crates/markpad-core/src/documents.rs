use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// One markdown note. Field names match the persisted JSON layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Newest first.
    #[default]
    Date,
    /// Case-insensitive A to Z.
    Title,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Date => "date",
            SortKey::Title => "title",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "date" => Some(SortKey::Date),
            "title" => Some(SortKey::Title),
            _ => None,
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            SortKey::Date => SortKey::Title,
            SortKey::Title => SortKey::Date,
        }
    }
}

pub fn default_title(number: usize) -> String {
    format!("Untitled Document {number}")
}

pub fn title_matches(title: &str, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    title.to_lowercase().contains(&query.to_lowercase())
}

fn compare_titles(a: &Document, b: &Document) -> Ordering {
    a.title
        .to_lowercase()
        .cmp(&b.title.to_lowercase())
        .then_with(|| a.title.cmp(&b.title))
}

/// Filters by `query` and orders by `sort` without touching the input.
/// Equal keys keep insertion order.
pub fn visible_documents<'a>(
    documents: &'a [Document],
    query: &str,
    sort: SortKey,
) -> Vec<&'a Document> {
    let mut visible: Vec<&Document> = documents
        .iter()
        .filter(|doc| title_matches(&doc.title, query))
        .collect();
    match sort {
        SortKey::Date => visible.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortKey::Title => visible.sort_by(|a, b| compare_titles(a, b)),
    }
    visible
}
