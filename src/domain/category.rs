/// A tracking category offered in the menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Category {
    /// Display label, also the key stored in every entry
    pub name: &'static str,
    /// Menu color (RGB)
    pub color: (u8, u8, u8),
    /// Whether time in this category counts towards "total active time"
    pub counts_as_active: bool,
}

impl Category {
    const fn new(name: &'static str, color: (u8, u8, u8), counts_as_active: bool) -> Self {
        Self {
            name,
            color,
            counts_as_active,
        }
    }
}

const CATEGORIES: &[Category] = &[
    Category::new("Work", (74, 144, 217), true),
    Category::new("Meetings", (155, 89, 182), true),
    Category::new("Email", (241, 196, 15), true),
    Category::new("Learning", (46, 204, 113), true),
    Category::new("Break", (149, 165, 166), false),
];

/// Get all categories in menu order
pub fn all() -> &'static [Category] {
    CATEGORIES
}

/// Look up a category by its exact name
pub fn find<'a>(categories: &'a [Category], name: &str) -> Option<&'a Category> {
    categories.iter().find(|c| c.name == name)
}
