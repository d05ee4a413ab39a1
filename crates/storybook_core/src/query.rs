//! Listing sort options.
//!
//! Sort keys are restricted to an allow-list. Anything else falls back to
//! newest-first, regardless of the requested order.

use serde::{Deserialize, Serialize};

/// Columns a listing may be sorted by.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
pub enum SortKey {
    /// Creation timestamp
    #[default]
    #[strum(to_string = "createdAt", serialize = "created_at")]
    #[serde(rename = "createdAt")]
    CreatedAt,
    /// Book title
    #[strum(serialize = "title")]
    #[serde(rename = "title")]
    Title,
    /// Book theme
    #[strum(serialize = "theme")]
    #[serde(rename = "theme")]
    Theme,
}

/// Sort direction.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum SortOrder {
    /// Ascending
    #[strum(serialize = "ASC")]
    #[serde(rename = "ASC")]
    Asc,
    /// Descending
    #[default]
    #[strum(serialize = "DESC")]
    #[serde(rename = "DESC")]
    Desc,
}

/// Raw listing parameters as received from a caller (`?sortBy=&order=`).
///
/// # Examples
///
/// ```
/// use storybook_core::{ListQuery, SortKey, SortOrder};
///
/// let query = ListQuery::new("title", "asc");
/// assert_eq!(query.resolve(), (SortKey::Title, SortOrder::Asc));
///
/// let query = ListQuery::new("not-a-column", "ASC");
/// assert_eq!(query.resolve(), (SortKey::CreatedAt, SortOrder::Desc));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    /// Requested sort column
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    /// Requested direction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<String>,
}

impl ListQuery {
    /// Build a query from raw strings.
    pub fn new(sort_by: impl Into<String>, order: impl Into<String>) -> Self {
        Self {
            sort_by: Some(sort_by.into()),
            order: Some(order.into()),
        }
    }

    /// Build a query from typed values.
    pub fn sorted(key: SortKey, order: SortOrder) -> Self {
        Self::new(key.to_string(), order.to_string())
    }

    /// Resolve to an allow-listed key and direction.
    ///
    /// A missing key means the default (`createdAt`) with the requested order;
    /// an unrecognized key means `createdAt DESC`. An unrecognized order means `DESC`.
    pub fn resolve(&self) -> (SortKey, SortOrder) {
        let order = self
            .order
            .as_deref()
            .and_then(|o| o.parse::<SortOrder>().ok())
            .unwrap_or_default();

        match self.sort_by.as_deref() {
            None | Some("") => (SortKey::CreatedAt, order),
            Some(raw) => match raw.parse::<SortKey>() {
                Ok(key) => (key, order),
                Err(_) => (SortKey::CreatedAt, SortOrder::Desc),
            },
        }
    }
}
