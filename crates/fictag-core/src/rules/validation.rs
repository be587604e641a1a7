use crate::error::CoreError;
use crate::rules::normalize::TagAlphabet;
use regex::Regex;

pub const EMPTY_TAG_MESSAGE: &str = "Empty tag";

pub const DEFAULT_BLACKLIST: &[(&str, &str)] =
    &[("^[0-9_]+$", "Tag must contain at least one letter")];

/// A deny-list entry matched against the normalized key.
#[derive(Debug, Clone)]
pub struct BlacklistRule {
    regex: Regex,
    message: String,
}

impl BlacklistRule {
    pub fn new(pattern: &str, message: &str) -> Result<Self, CoreError> {
        let regex = Regex::new(pattern).map_err(|err| CoreError::InvalidBlacklistPattern {
            pattern: pattern.to_string(),
            message: err.to_string(),
        })?;
        Ok(Self {
            regex,
            message: message.to_string(),
        })
    }

    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn matches(&self, iname: &str) -> bool {
        self.regex.is_match(iname)
    }
}

/// Normalization alphabet plus the name deny-list, resolved from configuration.
#[derive(Debug, Clone)]
pub struct TagRules {
    alphabet: TagAlphabet,
    blacklist: Vec<BlacklistRule>,
}

impl Default for TagRules {
    fn default() -> Self {
        let blacklist = DEFAULT_BLACKLIST
            .iter()
            .filter_map(|(pattern, message)| BlacklistRule::new(pattern, message).ok())
            .collect();
        Self {
            alphabet: TagAlphabet::default(),
            blacklist,
        }
    }
}

impl TagRules {
    pub fn new(alphabet: TagAlphabet, blacklist: Vec<BlacklistRule>) -> Self {
        Self {
            alphabet,
            blacklist,
        }
    }

    pub fn alphabet(&self) -> &TagAlphabet {
        &self.alphabet
    }

    pub fn blacklist(&self) -> &[BlacklistRule] {
        &self.blacklist
    }

    pub fn normalize(&self, raw: &str) -> Option<String> {
        self.alphabet.normalize(raw)
    }

    /// Returns why `raw` cannot name a tag, or `None` when it can.
    ///
    /// Uniqueness is not checked here; that needs the store.
    pub fn validate_tag_name(&self, raw: &str) -> Option<String> {
        let Some(iname) = self.normalize(raw) else {
            return Some(EMPTY_TAG_MESSAGE.to_string());
        };
        self.blacklist
            .iter()
            .find(|rule| rule.matches(&iname))
            .map(|rule| rule.message().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::{BlacklistRule, TagRules, EMPTY_TAG_MESSAGE};
    use crate::rules::normalize::TagAlphabet;

    #[test]
    fn validate_rejects_empty_names() {
        let rules = TagRules::default();
        assert_eq!(rules.validate_tag_name("×").as_deref(), Some(EMPTY_TAG_MESSAGE));
        assert_eq!(rules.validate_tag_name("   ").as_deref(), Some(EMPTY_TAG_MESSAGE));
    }

    #[test]
    fn validate_applies_default_blacklist() {
        let rules = TagRules::default();
        assert!(rules.validate_tag_name("2024").is_some());
        assert!(rules.validate_tag_name("2024 year").is_none());
    }

    #[test]
    fn validate_reports_first_matching_rule() {
        let rules = TagRules::new(
            TagAlphabet::default(),
            vec![
                BlacklistRule::new("^tag$", "Too generic").unwrap(),
                BlacklistRule::new("^ta", "Starts with ta").unwrap(),
            ],
        );
        assert_eq!(rules.validate_tag_name("TAG").as_deref(), Some("Too generic"));
        assert_eq!(rules.validate_tag_name("tail").as_deref(), Some("Starts with ta"));
        assert_eq!(rules.validate_tag_name("romance"), None);
    }

    #[test]
    fn blacklist_rule_rejects_bad_pattern() {
        assert!(BlacklistRule::new("(", "broken").is_err());
    }
}
