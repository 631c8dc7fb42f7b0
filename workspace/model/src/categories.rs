//! Fixed category vocabularies, keyed by entry kind. Business logic and
//! the recognition rules select from these; free-form categories are
//! still accepted by the store and fall back to the default icon.

use crate::entities::entry::EntryKind;

/// A selectable category with its display icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryDef {
    pub name: &'static str,
    pub icon: &'static str,
}

/// Workout categories (kind = `expense`).
pub const WORKOUT_CATEGORIES: &[CategoryDef] = &[
    CategoryDef { name: "跑步", icon: "footprints" },
    CategoryDef { name: "力量训练", icon: "dumbbell" },
    CategoryDef { name: "游泳", icon: "waves" },
    CategoryDef { name: "瑜伽", icon: "flower-2" },
    CategoryDef { name: "骑行", icon: "bike" },
    CategoryDef { name: "篮球", icon: "circle-dot" },
    CategoryDef { name: "足球", icon: "circle" },
    CategoryDef { name: "羽毛球", icon: "wind" },
    CategoryDef { name: "登山", icon: "mountain" },
    CategoryDef { name: "其他", icon: "more-horizontal" },
];

/// Body-area tags (kind = `income`).
pub const BODY_AREA_CATEGORIES: &[CategoryDef] = &[
    CategoryDef { name: "全身", icon: "person-standing" },
    CategoryDef { name: "上肢", icon: "hand" },
    CategoryDef { name: "下肢", icon: "footprints" },
    CategoryDef { name: "核心", icon: "target" },
    CategoryDef { name: "有氧", icon: "heart-pulse" },
    CategoryDef { name: "拉伸", icon: "move" },
];

/// Catch-all category name used when nothing else matches.
pub const FALLBACK_CATEGORY: &str = "其他";

/// Icon used for categories outside the vocabulary.
pub const DEFAULT_ICON: &str = "circle";

pub fn vocabulary(kind: EntryKind) -> &'static [CategoryDef] {
    match kind {
        EntryKind::Income => BODY_AREA_CATEGORIES,
        EntryKind::Expense => WORKOUT_CATEGORIES,
    }
}

/// Look up the icon for a category within a kind's vocabulary.
pub fn icon_for(kind: EntryKind, category: &str) -> &'static str {
    vocabulary(kind)
        .iter()
        .find(|def| def.name == category)
        .map(|def| def.icon)
        .unwrap_or(DEFAULT_ICON)
}
