//! Pure query layer: filtered and grouped views over current state.
//!
//! Everything here is side-effect free and recomputed from the ideas and
//! folders the store holds; nothing in this module mutates state.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{Idea, IdeaUpdate};

/// Folder selector for idea filtering.
///
/// `All` and `Uncategorized` are virtual selectors; anything else is an
/// exact folder-id match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FolderFilter {
    All,
    Uncategorized,
    Folder(String),
}

impl FolderFilter {
    /// Parse a query-string selector: "all", "uncategorized", or a folder id.
    pub fn from_selector(selector: &str) -> Self {
        match selector {
            "all" => FolderFilter::All,
            "uncategorized" => FolderFilter::Uncategorized,
            id => FolderFilter::Folder(id.to_string()),
        }
    }

    /// Whether an idea passes this folder selector.
    pub fn matches(&self, idea: &Idea) -> bool {
        match self {
            FolderFilter::All => true,
            FolderFilter::Uncategorized => idea.folder_id.is_none(),
            FolderFilter::Folder(id) => idea.folder_id.as_deref() == Some(id.as_str()),
        }
    }
}

impl Default for FolderFilter {
    fn default() -> Self {
        FolderFilter::All
    }
}

/// Whether an idea passes the folder selector and, when set, the
/// case-insensitive substring search over title, content, and tags.
pub fn idea_matches(idea: &Idea, filter: &FolderFilter, search: Option<&str>) -> bool {
    if !filter.matches(idea) {
        return false;
    }

    let Some(query) = search.map(str::trim).filter(|q| !q.is_empty()) else {
        return true;
    };

    let needle = query.to_lowercase();
    idea.title.to_lowercase().contains(&needle)
        || idea.content.to_lowercase().contains(&needle)
        || idea
            .tags
            .iter()
            .any(|tag| tag.to_lowercase().contains(&needle))
}

/// Filter a snapshot of ideas, preserving collection order.
pub fn filter_ideas(ideas: &[Idea], filter: &FolderFilter, search: Option<&str>) -> Vec<Idea> {
    ideas
        .iter()
        .filter(|idea| idea_matches(idea, filter, search))
        .cloned()
        .collect()
}

/// A calendar-month bucket of ideas.
#[derive(Debug, Clone, Serialize)]
pub struct MonthGroup {
    pub year: i32,
    pub month: u32,
    /// "2024-02" style label
    pub label: String,
    pub ideas: Vec<Idea>,
}

/// Bucket ideas by `(year, month)` of `created_at`.
///
/// Buckets come back most-recent-month-first; within a bucket ideas are
/// most-recently-created-first.
pub fn group_by_month(ideas: Vec<Idea>) -> Vec<MonthGroup> {
    let mut buckets: std::collections::BTreeMap<(i32, u32), Vec<Idea>> =
        std::collections::BTreeMap::new();

    for idea in ideas {
        let key = (idea.created_at.year(), idea.created_at.month());
        buckets.entry(key).or_default().push(idea);
    }

    buckets
        .into_iter()
        .rev()
        .map(|((year, month), mut ideas)| {
            ideas.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            MonthGroup {
                year,
                month,
                label: format!("{:04}-{:02}", year, month),
                ideas,
            }
        })
        .collect()
}

/// A calendar-day bucket of timeline updates.
#[derive(Debug, Clone, Serialize)]
pub struct DayGroup {
    pub date: NaiveDate,
    pub updates: Vec<IdeaUpdate>,
}

/// Bucket an idea's updates by calendar day of `timestamp`.
///
/// Buckets come back most-recent-day-first; within a bucket updates are
/// most-recent-first. The stored append order is untouched; this is a
/// derived view.
pub fn group_updates_by_day(updates: &[IdeaUpdate]) -> Vec<DayGroup> {
    let mut buckets: std::collections::BTreeMap<NaiveDate, Vec<IdeaUpdate>> =
        std::collections::BTreeMap::new();

    for update in updates {
        buckets
            .entry(update.timestamp.date_naive())
            .or_default()
            .push(update.clone());
    }

    buckets
        .into_iter()
        .rev()
        .map(|(date, mut updates)| {
            updates.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
            DayGroup { date, updates }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::UpdateKind;
    use chrono::{TimeZone, Utc};

    fn idea_created(title: &str, year: i32, month: u32, day: u32) -> Idea {
        let mut idea = Idea::new(title, "");
        idea.created_at = Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap();
        idea.last_modified = idea.created_at;
        idea
    }

    #[test]
    fn test_folder_filter_selectors() {
        assert_eq!(FolderFilter::from_selector("all"), FolderFilter::All);
        assert_eq!(
            FolderFilter::from_selector("uncategorized"),
            FolderFilter::Uncategorized
        );
        assert_eq!(
            FolderFilter::from_selector("f1"),
            FolderFilter::Folder("f1".to_string())
        );
    }

    #[test]
    fn test_all_passes_everything() {
        let mut in_folder = Idea::new("a", "");
        in_folder.folder_id = Some("f1".to_string());
        let uncategorized = Idea::new("b", "");

        let ideas = vec![in_folder, uncategorized];
        let all = filter_ideas(&ideas, &FolderFilter::All, None);
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn test_uncategorized_matches_absent_folder_only() {
        let mut in_folder = Idea::new("a", "");
        in_folder.folder_id = Some("f1".to_string());
        let uncategorized = Idea::new("b", "");

        let ideas = vec![in_folder, uncategorized];
        let filtered = filter_ideas(&ideas, &FolderFilter::Uncategorized, None);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].title, "b");
    }

    #[test]
    fn test_folder_id_exact_match() {
        let mut a = Idea::new("a", "");
        a.folder_id = Some("f1".to_string());
        let mut b = Idea::new("b", "");
        b.folder_id = Some("f2".to_string());

        let ideas = vec![a, b];
        let filtered = filter_ideas(&ideas, &FolderFilter::Folder("f2".into()), None);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].title, "b");
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let mut idea = Idea::new("Solar tracker", "panel angles");
        idea.tags = vec!["hardware".to_string()];
        let other = Idea::new("Grocery app", "shopping lists");

        let ideas = vec![idea, other];
        assert_eq!(filter_ideas(&ideas, &FolderFilter::All, Some("SOLAR")).len(), 1);
        assert_eq!(filter_ideas(&ideas, &FolderFilter::All, Some("angle")).len(), 1);
        assert_eq!(filter_ideas(&ideas, &FolderFilter::All, Some("list")).len(), 1);
    }

    #[test]
    fn test_search_matches_tag_only() {
        let mut tagged = Idea::new("a", "");
        tagged.tags = vec!["fermentation".to_string()];
        let plain = Idea::new("b", "");

        let ideas = vec![tagged, plain];
        let filtered = filter_ideas(&ideas, &FolderFilter::All, Some("ferment"));
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].title, "a");
    }

    #[test]
    fn test_blank_search_passes() {
        let ideas = vec![Idea::new("a", "")];
        assert_eq!(filter_ideas(&ideas, &FolderFilter::All, Some("  ")).len(), 1);
    }

    #[test]
    fn test_month_groups_newest_first() {
        let january = idea_created("jan", 2024, 1, 5);
        let february = idea_created("feb", 2024, 2, 10);

        let groups = group_by_month(vec![january, february]);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].label, "2024-02");
        assert_eq!(groups[1].label, "2024-01");
    }

    #[test]
    fn test_month_bucket_orders_ideas_newest_first() {
        let early = idea_created("early", 2024, 3, 2);
        let late = idea_created("late", 2024, 3, 20);

        let groups = group_by_month(vec![early, late]);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].ideas[0].title, "late");
        assert_eq!(groups[0].ideas[1].title, "early");
    }

    #[test]
    fn test_day_groups_newest_first() {
        let mut monday = IdeaUpdate::new("monday", UpdateKind::Update);
        monday.timestamp = Utc.with_ymd_and_hms(2024, 6, 3, 9, 0, 0).unwrap();
        let mut tuesday_am = IdeaUpdate::new("tuesday am", UpdateKind::Update);
        tuesday_am.timestamp = Utc.with_ymd_and_hms(2024, 6, 4, 9, 0, 0).unwrap();
        let mut tuesday_pm = IdeaUpdate::new("tuesday pm", UpdateKind::Milestone);
        tuesday_pm.timestamp = Utc.with_ymd_and_hms(2024, 6, 4, 17, 0, 0).unwrap();

        // Stored order is append order; view re-derives.
        let groups = group_updates_by_day(&[monday, tuesday_am, tuesday_pm]);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].date, NaiveDate::from_ymd_opt(2024, 6, 4).unwrap());
        assert_eq!(groups[0].updates[0].content, "tuesday pm");
        assert_eq!(groups[0].updates[1].content, "tuesday am");
        assert_eq!(groups[1].updates[0].content, "monday");
    }
}
