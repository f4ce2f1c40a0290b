//! Domain DTOs and view state for the item list.
//!
//! # Design
//! Wire types mirror the backend's schema but are defined independently of
//! the mock-server crate; integration tests catch schema drift. Fields are
//! owned `String` / `Vec` values so state snapshots clone cheaply enough
//! and carry no lifetimes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Page size used when the caller has not picked one.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Page sizes offered by the standard page-size selector.
pub const PAGE_SIZE_CHOICES: [u32; 3] = [5, 10, 25];

/// Grouping key for items whose category is empty.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// A single item as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Item {
    pub id: u64,
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// Form contents for a new or edited item; serializes as the create/update
/// request body. The id is never part of a draft — the server assigns it.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct ItemDraft {
    pub name: String,
    pub category: String,
    pub description: String,
}

impl ItemDraft {
    /// First required field that is empty or whitespace, if any. `name` and
    /// `category` are required; `description` is free-form.
    pub fn missing_required_field(&self) -> Option<&'static str> {
        if self.name.trim().is_empty() {
            Some("name")
        } else if self.category.trim().is_empty() {
            Some("category")
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

impl From<&Item> for ItemDraft {
    fn from(item: &Item) -> Self {
        Self {
            name: item.name.clone(),
            category: item.category.clone(),
            description: item.description.clone(),
        }
    }
}

/// Parameters of one list request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub page: u32,
    pub page_size: u32,
    pub search: String,
}

/// One page of list results: the total match count for the query plus the
/// current page's items. The backend also sends `next`/`previous` links,
/// which deserialization ignores.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ItemPage {
    pub count: u64,
    pub results: Vec<Item>,
}

/// Everything the rendering layer needs to draw the list screen. Owned by
/// the controller; callers read it and issue operations, never mutate it
/// directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    /// Exactly the current page's results from the last successful list
    /// call.
    pub items: Vec<Item>,
    /// Current page, 1-indexed.
    pub page: u32,
    pub page_size: u32,
    /// Total items matching the current search, across all pages.
    pub total_count: u64,
    pub search: String,
    /// When set, the draft edits this item instead of creating a new one.
    pub editing_id: Option<u64>,
    /// True exactly while a request is in flight.
    pub is_loading: bool,
    pub draft: ItemDraft,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            total_count: 0,
            search: String::new(),
            editing_id: None,
            is_loading: false,
            draft: ItemDraft::default(),
        }
    }
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of pages for the current query; 0 when nothing matches.
    pub fn total_pages(&self) -> u32 {
        if self.total_count == 0 {
            return 0;
        }
        self.total_count.div_ceil(self.page_size as u64) as u32
    }

    pub fn has_prev_page(&self) -> bool {
        self.page > 1
    }

    /// Whether a further page exists; gates the "Next" control.
    pub fn has_next_page(&self) -> bool {
        (self.page as u64) * (self.page_size as u64) < self.total_count
    }

    /// Current page's items grouped for display.
    pub fn grouped(&self) -> Vec<CategoryGroup> {
        group_by_category(&self.items)
    }
}

/// One display group: a category and its items, both in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryGroup {
    pub category: String,
    pub items: Vec<Item>,
}

/// Partition items by category for display. Groups appear in the order
/// their category is first seen in the input, and items keep their input
/// order within each group; an empty category groups under
/// [`UNCATEGORIZED`]. Pure function over the given slice — pagination
/// counts are unaffected.
pub fn group_by_category(items: &[Item]) -> Vec<CategoryGroup> {
    let mut groups: Vec<CategoryGroup> = Vec::new();
    for item in items {
        let key = if item.category.is_empty() {
            UNCATEGORIZED
        } else {
            item.category.as_str()
        };
        match groups.iter_mut().find(|g| g.category == key) {
            Some(group) => group.items.push(item.clone()),
            None => groups.push(CategoryGroup {
                category: key.to_string(),
                items: vec![item.clone()],
            }),
        }
    }
    groups
}
