//! MangaUpdates models reading state as named lists instead of a status field.
//!
//! Every account has the five default lists below. Users can also create
//! custom lists; those have their own ids and names and are passed through
//! unmapped wherever the static table has no row for them.

use serde::Serialize;

use crate::traits::{TrackEntry, TrackStatus};

/// A default list and the canonical status it stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListMapping {
    pub id: &'static str,
    pub name: &'static str,
    pub status: TrackStatus,
}

pub const DEFAULT_LISTS: &[ListMapping] = &[
    ListMapping {
        id: "0",
        name: "Reading List",
        status: TrackStatus::Reading,
    },
    ListMapping {
        id: "1",
        name: "Wish List",
        status: TrackStatus::Planning,
    },
    ListMapping {
        id: "2",
        name: "Complete List",
        status: TrackStatus::Completed,
    },
    ListMapping {
        id: "3",
        name: "Unfinished List",
        status: TrackStatus::Dropped,
    },
    ListMapping {
        id: "4",
        name: "On Hold List",
        status: TrackStatus::Paused,
    },
];

/// A selectable list row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListOption {
    pub id: String,
    pub name: String,
    pub status: TrackStatus,
}

impl From<&ListMapping> for ListOption {
    fn from(mapping: &ListMapping) -> Self {
        Self {
            id: mapping.id.to_string(),
            name: mapping.name.to_string(),
            status: mapping.status,
        }
    }
}

pub fn find_list(list_id: &str) -> Option<&'static ListMapping> {
    DEFAULT_LISTS.iter().find(|m| m.id == list_id)
}

/// The default list an entry without a list id is filed under.
pub fn default_list_for_status(status: TrackStatus) -> &'static ListMapping {
    DEFAULT_LISTS
        .iter()
        .find(|m| m.status == status)
        .unwrap_or(&DEFAULT_LISTS[0])
}

/// Canonical status for a custom list, from the MangaUpdates list type.
pub fn status_for_list_type(kind: &str) -> TrackStatus {
    match kind {
        "wish" => TrackStatus::Planning,
        "complete" => TrackStatus::Completed,
        "unfinished" => TrackStatus::Dropped,
        "hold" => TrackStatus::Paused,
        _ => TrackStatus::Reading,
    }
}

/// Rows to offer for `entry`: the default lists, plus the entry's own list
/// when its id/name pair is not one of them.
pub fn list_options(entry: &TrackEntry) -> Vec<ListOption> {
    let mut options: Vec<ListOption> = DEFAULT_LISTS.iter().map(ListOption::from).collect();

    if let (Some(id), Some(name)) = (&entry.list_id, &entry.list_name) {
        let known = DEFAULT_LISTS
            .iter()
            .any(|m| m.id == id.as_str() && m.name == name.as_str());
        if !known {
            options.push(ListOption {
                id: id.clone(),
                name: name.clone(),
                status: entry.status,
            });
        }
    }
    options
}

/// Move `entry` to `list_id`. Name and status come from the default table
/// when it has the list; otherwise the entry's current ones are kept.
pub fn select_list(entry: &TrackEntry, list_id: &str) -> TrackEntry {
    let mapping = find_list(list_id);
    TrackEntry {
        list_id: Some(list_id.to_string()),
        list_name: mapping
            .map(|m| m.name.to_string())
            .or_else(|| entry.list_name.clone()),
        status: mapping.map(|m| m.status).unwrap_or(entry.status),
        ..entry.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry_on(list_id: &str, list_name: &str, status: TrackStatus) -> TrackEntry {
        TrackEntry {
            list_id: Some(list_id.into()),
            list_name: Some(list_name.into()),
            status,
            ..TrackEntry::new("55099564912")
        }
    }

    #[test]
    fn test_default_entry_adds_no_row() {
        let entry = entry_on("2", "Complete List", TrackStatus::Completed);
        assert_eq!(list_options(&entry).len(), DEFAULT_LISTS.len());
    }

    #[test]
    fn test_custom_list_is_synthesized() {
        let entry = entry_on("101", "Webtoons", TrackStatus::Reading);
        let options = list_options(&entry);
        assert_eq!(options.len(), DEFAULT_LISTS.len() + 1);
        let last = options.last().unwrap();
        assert_eq!(last.id, "101");
        assert_eq!(last.name, "Webtoons");
    }

    #[test]
    fn test_renamed_default_list_is_synthesized() {
        let entry = entry_on("0", "Currently Reading", TrackStatus::Reading);
        assert_eq!(list_options(&entry).len(), DEFAULT_LISTS.len() + 1);
    }

    #[test]
    fn test_select_known_list_derives_status() {
        let entry = entry_on("0", "Reading List", TrackStatus::Reading);
        let moved = select_list(&entry, "4");
        assert_eq!(moved.list_name.as_deref(), Some("On Hold List"));
        assert_eq!(moved.status, TrackStatus::Paused);
    }

    #[test]
    fn test_select_unknown_list_passes_through() {
        let entry = entry_on("101", "Webtoons", TrackStatus::Dropped);
        let moved = select_list(&entry, "101");
        assert_eq!(moved.list_id.as_deref(), Some("101"));
        assert_eq!(moved.list_name.as_deref(), Some("Webtoons"));
        assert_eq!(moved.status, TrackStatus::Dropped);
    }

    #[test]
    fn test_default_list_for_status() {
        assert_eq!(default_list_for_status(TrackStatus::Planning).id, "1");
        assert_eq!(default_list_for_status(TrackStatus::Dropped).id, "3");
        for mapping in DEFAULT_LISTS {
            assert_eq!(default_list_for_status(mapping.status), mapping);
        }
    }

    #[test]
    fn test_list_type_status() {
        assert_eq!(status_for_list_type("hold"), TrackStatus::Paused);
        assert_eq!(status_for_list_type("read"), TrackStatus::Reading);
        assert_eq!(status_for_list_type("something-new"), TrackStatus::Reading);
    }
}
