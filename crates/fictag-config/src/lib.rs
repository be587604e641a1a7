use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use fictag_core::rules::{
    BlacklistRule, LookupMode, TagAlphabet, TagPolicy, TagRules, DEFAULT_BLACKLIST,
    DEFAULT_MAX_SEARCH_LIMIT,
};
use fictag_core::CoreError;
use serde::Deserialize;
use thiserror::Error;

const APP_DIR: &str = "fictag";
const CONFIG_FILENAME: &str = "config.toml";

#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub tags: TagPolicy,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing home directory")]
    MissingHomeDir,
    #[error("invalid config path: {0}")]
    InvalidConfigPath(PathBuf),
    #[error("config file not found: {0}")]
    MissingConfigFile(PathBuf),
    #[error("invalid tag alphabet: {0}")]
    InvalidAlphabet(#[source] CoreError),
    #[error("invalid tag blacklist entry: {0}")]
    InvalidBlacklist(#[source] CoreError),
    #[error("invalid primary_cap value: {0}")]
    InvalidPrimaryCap(usize),
    #[error("invalid max_search_limit value: {0}")]
    InvalidSearchLimit(usize),
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    tags: Option<TagsFile>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct TagsFile {
    extra_letters: Option<String>,
    extra_delimiters: Option<String>,
    lookup: Option<LookupMode>,
    primary_cap: Option<usize>,
    max_search_limit: Option<usize>,
    /// Replaces the built-in deny-list when present, even if empty.
    blacklist: Option<Vec<BlacklistFile>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct BlacklistFile {
    pattern: String,
    message: String,
}

pub fn load(config_path: Option<PathBuf>) -> Result<AppConfig> {
    let required = config_path.is_some();
    let path = match resolve_config_path(config_path) {
        Ok(path) => path,
        Err(ConfigError::MissingHomeDir) if !required => return Ok(AppConfig::default()),
        Err(ConfigError::InvalidConfigPath(_)) if !required => return Ok(AppConfig::default()),
        Err(err) => return Err(err),
    };
    match load_at_path(&path, required)? {
        Some(config) => Ok(config),
        None => Ok(AppConfig::default()),
    }
}

pub fn resolve_config_path(custom: Option<PathBuf>) -> Result<PathBuf> {
    match custom {
        Some(path) => {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::InvalidConfigPath(path));
            }
            Ok(path)
        }
        None => {
            let base = if let Some(dir) = env::var_os("XDG_CONFIG_HOME") {
                let path = PathBuf::from(dir);
                if path.as_os_str().is_empty() {
                    return Err(ConfigError::InvalidConfigPath(path));
                }
                path
            } else {
                let home = dirs::home_dir().ok_or(ConfigError::MissingHomeDir)?;
                home.join(".config")
            };
            Ok(base.join(APP_DIR).join(CONFIG_FILENAME))
        }
    }
}

fn load_at_path(path: &Path, required: bool) -> Result<Option<AppConfig>> {
    if !path.exists() {
        if required {
            return Err(ConfigError::MissingConfigFile(path.to_path_buf()));
        }
        return Ok(None);
    }

    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed: ConfigFile = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(merge_config(parsed)?))
}

fn merge_config(parsed: ConfigFile) -> Result<AppConfig> {
    let mut config = AppConfig::default();
    let Some(tags) = parsed.tags else {
        return Ok(config);
    };

    let alphabet = TagAlphabet::extended(
        tags.extra_letters.as_deref().unwrap_or_default(),
        tags.extra_delimiters.as_deref().unwrap_or_default(),
    )
    .map_err(ConfigError::InvalidAlphabet)?;

    let blacklist = match tags.blacklist {
        Some(entries) => entries
            .iter()
            .map(|entry| BlacklistRule::new(&entry.pattern, &entry.message))
            .collect::<std::result::Result<Vec<_>, _>>(),
        None => DEFAULT_BLACKLIST
            .iter()
            .map(|(pattern, message)| BlacklistRule::new(pattern, message))
            .collect(),
    }
    .map_err(ConfigError::InvalidBlacklist)?;

    config.tags.rules = TagRules::new(alphabet, blacklist);

    if let Some(lookup) = tags.lookup {
        config.tags.lookup = lookup;
    }

    if let Some(cap) = tags.primary_cap {
        if cap == 0 {
            return Err(ConfigError::InvalidPrimaryCap(cap));
        }
        config.tags.primary_cap = cap;
    }

    if let Some(limit) = tags.max_search_limit {
        if limit == 0 || limit > DEFAULT_MAX_SEARCH_LIMIT {
            return Err(ConfigError::InvalidSearchLimit(limit));
        }
        config.tags.max_search_limit = limit;
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::{
        load_at_path, merge_config, BlacklistFile, ConfigError, ConfigFile, LookupMode, TagsFile,
    };
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn merge_config_applies_values() {
        let parsed = ConfigFile {
            tags: Some(TagsFile {
                extra_letters: Some("ğ".to_string()),
                extra_delimiters: Some("§".to_string()),
                lookup: Some(LookupMode::Batched),
                primary_cap: Some(3),
                max_search_limit: Some(50),
                blacklist: Some(vec![BlacklistFile {
                    pattern: "^tag$".to_string(),
                    message: "Too generic".to_string(),
                }]),
            }),
        };
        let merged = merge_config(parsed).expect("merge");
        assert_eq!(merged.tags.lookup, LookupMode::Batched);
        assert_eq!(merged.tags.primary_cap, 3);
        assert_eq!(merged.tags.max_search_limit, 50);
        assert_eq!(merged.tags.rules.normalize("Doğa§Deniz").as_deref(), Some("doğa_deniz"));
        assert_eq!(
            merged.tags.rules.validate_tag_name("Tag").as_deref(),
            Some("Too generic")
        );
        assert!(merged.tags.rules.validate_tag_name("2024").is_none());
    }

    #[test]
    fn merge_config_keeps_default_blacklist_when_absent() {
        let parsed = ConfigFile {
            tags: Some(TagsFile::default()),
        };
        let merged = merge_config(parsed).expect("merge");
        assert!(merged.tags.rules.validate_tag_name("2024").is_some());
    }

    #[test]
    fn merge_config_rejects_overlapping_alphabet() {
        let parsed = ConfigFile {
            tags: Some(TagsFile {
                extra_delimiters: Some("a".to_string()),
                ..TagsFile::default()
            }),
        };
        let err = merge_config(parsed).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidAlphabet(_)));
    }

    #[test]
    fn merge_config_rejects_bad_pattern() {
        let parsed = ConfigFile {
            tags: Some(TagsFile {
                blacklist: Some(vec![BlacklistFile {
                    pattern: "(".to_string(),
                    message: "broken".to_string(),
                }]),
                ..TagsFile::default()
            }),
        };
        let err = merge_config(parsed).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBlacklist(_)));
    }

    #[test]
    fn load_at_path_requires_file_when_requested() {
        let temp = TempDir::new().expect("tempdir");
        let missing = temp.path().join("config.toml");
        let err = load_at_path(&missing, true).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("config file not found"));
        assert!(load_at_path(&missing, false).expect("optional").is_none());
    }

    #[test]
    fn load_at_path_parses_toml() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("config.toml");
        fs::write(
            &path,
            "[tags]\nlookup = \"batched\"\nprimary_cap = 4\n\n[[tags.blacklist]]\npattern = \"^x+$\"\nmessage = \"No\"\n",
        )
        .expect("write config");

        let config = load_at_path(&path, true).expect("load").expect("config");
        assert_eq!(config.tags.lookup, LookupMode::Batched);
        assert_eq!(config.tags.primary_cap, 4);
        assert_eq!(config.tags.rules.validate_tag_name("XXX").as_deref(), Some("No"));
    }

    #[test]
    fn load_at_path_rejects_unknown_keys() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("config.toml");
        fs::write(&path, "[tags]\nwhitelist = \"abc\"\n").expect("write config");
        let err = load_at_path(&path, true).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
