use crate::domain::{category, Category, TimeEntry};

/// Tracked time for one category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTotal {
    pub name: String,
    pub seconds: i64,
    pub counts_as_active: bool,
}

/// Per-category totals for a list of entries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    /// Configured categories first (menu order), then unknown ones as first seen
    pub totals: Vec<CategoryTotal>,
    /// Sum over categories that count as active
    pub total_active_seconds: i64,
    /// Sum over every category
    pub total_seconds: i64,
}

impl Summary {
    /// Group entries by category and sum whole seconds.
    ///
    /// Categories without entries are left out. Names missing from the
    /// configuration count as active.
    pub fn from_entries(entries: &[TimeEntry], categories: &[Category]) -> Self {
        let mut totals: Vec<CategoryTotal> = Vec::new();

        for entry in entries {
            let seconds = entry.duration().num_seconds();
            match totals.iter_mut().find(|t| t.name == entry.category) {
                Some(total) => total.seconds += seconds,
                None => totals.push(CategoryTotal {
                    name: entry.category.clone(),
                    seconds,
                    counts_as_active: category::find(categories, &entry.category)
                        .map_or(true, |c| c.counts_as_active),
                }),
            }
        }

        let menu_position = |name: &str| {
            categories
                .iter()
                .position(|c| c.name == name)
                .unwrap_or(categories.len())
        };
        // Stable sort keeps first-seen order among unknown categories
        totals.sort_by_key(|t| menu_position(&t.name));

        let total_active_seconds = totals
            .iter()
            .filter(|t| t.counts_as_active)
            .map(|t| t.seconds)
            .sum();
        let total_seconds = totals.iter().map(|t| t.seconds).sum();

        Self {
            totals,
            total_active_seconds,
            total_seconds,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    /// Seconds tracked for a category (0 if none)
    pub fn seconds_for(&self, name: &str) -> i64 {
        self.totals
            .iter()
            .find(|t| t.name == name)
            .map_or(0, |t| t.seconds)
    }
}

/// Format seconds as HH:MM:SS; hours are not wrapped at 24
pub fn format_hms(seconds: i64) -> String {
    let seconds = seconds.max(0);
    format!(
        "{:02}:{:02}:{:02}",
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60
    )
}
