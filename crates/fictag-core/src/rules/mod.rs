pub mod display;
pub mod normalize;
pub mod policy;
pub mod validation;

pub use display::{prepare_story_tags, PreparedTags, DEFAULT_PRIMARY_TAGS_CAP};
pub use normalize::{
    normalize_display_name, normalize_tag, TagAlphabet, DEFAULT_TAG_DELIMITERS,
    DEFAULT_TAG_LETTERS, MAX_INAME_LEN, MAX_NAME_LEN,
};
pub use policy::{LookupMode, TagPolicy, DEFAULT_MAX_SEARCH_LIMIT};
pub use validation::{BlacklistRule, TagRules, DEFAULT_BLACKLIST, EMPTY_TAG_MESSAGE};
