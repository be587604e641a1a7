use crate::rules::display::DEFAULT_PRIMARY_TAGS_CAP;
use crate::rules::validation::TagRules;
use serde::Deserialize;

pub const DEFAULT_MAX_SEARCH_LIMIT: usize = 100;

/// How the resolver fetches tags for raw names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LookupMode {
    /// One query per normalized key. Immune to collation mismatches between
    /// the database and the normalizer.
    #[default]
    PerItem,
    /// A single multi-key query. Safe only with binary key collation.
    Batched,
}

/// Everything configurable about tag handling.
#[derive(Debug, Clone)]
pub struct TagPolicy {
    pub rules: TagRules,
    pub lookup: LookupMode,
    pub primary_cap: usize,
    pub max_search_limit: usize,
}

impl Default for TagPolicy {
    fn default() -> Self {
        Self {
            rules: TagRules::default(),
            lookup: LookupMode::default(),
            primary_cap: DEFAULT_PRIMARY_TAGS_CAP,
            max_search_limit: DEFAULT_MAX_SEARCH_LIMIT,
        }
    }
}
