//! # Shared Rule Constraints

use serde::{Deserialize, Serialize};

/// A page-id exclusion: a single id or an inclusive `[lo, hi]` range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExcludeEntry {
    /// A single excluded page id.
    Id(i64),

    /// An inclusive `[lo, hi]` range of excluded ids.
    Range([i64; 2]),
}

impl ExcludeEntry {
    /// Does this entry exclude the given page id?
    pub fn contains(
        &self,
        id: i64,
    ) -> bool {
        match self {
            Self::Id(x) => *x == id,
            Self::Range([lo, hi]) => (*lo..=*hi).contains(&id),
        }
    }
}

/// The page-id constraint record shared by split rules and breakpoints.
///
/// `min`/`max` restrict a rule to an inclusive page-id range; `exclude`
/// lists ids or ranges it never applies to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RuleConstraints {
    /// Minimum admitted page id, inclusive.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<i64>,

    /// Maximum admitted page id, inclusive.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<i64>,

    /// Page ids or inclusive ranges the rule never applies to.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<ExcludeEntry>,
}

impl RuleConstraints {
    /// Is the page id within `[min, max]` and not excluded?
    pub fn admits(
        &self,
        id: i64,
    ) -> bool {
        self.in_range(id) && !self.excludes(id)
    }

    /// Is the page id within `[min, max]`?
    pub fn in_range(
        &self,
        id: i64,
    ) -> bool {
        self.min.is_none_or(|m| id >= m) && self.max.is_none_or(|m| id <= m)
    }

    /// Is the page id in the exclude set?
    pub fn excludes(
        &self,
        id: i64,
    ) -> bool {
        self.exclude.iter().any(|e| e.contains(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admits_range_and_exclude() {
        let c = RuleConstraints {
            min: Some(10),
            max: Some(20),
            exclude: vec![ExcludeEntry::Id(12), ExcludeEntry::Range([15, 17])],
        };

        assert!(!c.admits(9));
        assert!(c.admits(10));
        assert!(!c.admits(12));
        assert!(c.admits(14));
        assert!(!c.admits(16));
        assert!(c.admits(20));
        assert!(!c.admits(21));
    }

    #[test]
    fn test_default_admits_everything() {
        let c = RuleConstraints::default();
        assert!(c.admits(i64::MIN));
        assert!(c.admits(0));
        assert!(c.admits(i64::MAX));
    }

    #[test]
    fn test_exclude_serde_shapes() {
        let c: RuleConstraints =
            serde_json::from_value(serde_json::json!({ "exclude": [3, [5, 9]] })).unwrap();
        assert!(c.excludes(3));
        assert!(c.excludes(7));
        assert!(!c.excludes(4));
    }
}
