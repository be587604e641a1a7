use crate::error::CoreError;
use std::collections::HashSet;
use std::sync::OnceLock;

/// Upper bound on the stored index key, in characters.
pub const MAX_INAME_LEN: usize = 32;
/// Upper bound on a display name after cleanup, in characters.
pub const MAX_NAME_LEN: usize = 64;

pub const DEFAULT_TAG_LETTERS: &str = concat!(
    "abcdefghijklmnopqrstuvwxyz0123456789",
    "àáâãäåæçèéêëìíîïñòóôõöøùúûüýÿßœ",
    "абвгдеёжзийклмнопрстуфхцчшщъыьэюяіїєґў",
    "αβγδεζηθικλμνξοπρστυφχψωάέήίόύώϊϋς",
    "+&#",
);

/// Characters folded into `_`. Every Unicode whitespace character is a
/// delimiter as well, whether or not it is listed here.
pub const DEFAULT_TAG_DELIMITERS: &str = "_-.,:;/\\|!?()[]{}<>\"'`«»„“”‘’*=~^";

/// Character classes used to derive a tag's index key.
///
/// Changing either set changes stored keys, so existing `iname` values must be
/// recomputed whenever the configuration changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagAlphabet {
    letters: HashSet<char>,
    delimiters: HashSet<char>,
}

impl Default for TagAlphabet {
    fn default() -> Self {
        Self {
            letters: DEFAULT_TAG_LETTERS.chars().collect(),
            delimiters: DEFAULT_TAG_DELIMITERS.chars().collect(),
        }
    }
}

impl TagAlphabet {
    pub fn new(letters: &str, delimiters: &str) -> Result<Self, CoreError> {
        let letters: HashSet<char> = letters.chars().flat_map(char::to_lowercase).collect();
        let mut delimiters: HashSet<char> = delimiters.chars().collect();
        delimiters.insert('_');

        if letters.contains(&'_') {
            return Err(CoreError::ReservedTagChar);
        }
        if let Some(ch) = letters
            .iter()
            .find(|ch| ch.is_whitespace() || delimiters.contains(ch))
        {
            return Err(CoreError::AmbiguousTagChar(*ch));
        }

        Ok(Self {
            letters,
            delimiters,
        })
    }

    /// Default sets plus the given extras.
    pub fn extended(extra_letters: &str, extra_delimiters: &str) -> Result<Self, CoreError> {
        let letters = format!("{DEFAULT_TAG_LETTERS}{extra_letters}");
        let delimiters = format!("{DEFAULT_TAG_DELIMITERS}{extra_delimiters}");
        Self::new(&letters, &delimiters)
    }

    pub fn is_letter(&self, ch: char) -> bool {
        self.letters.contains(&ch)
    }

    pub fn is_delimiter(&self, ch: char) -> bool {
        ch.is_whitespace() || self.delimiters.contains(&ch)
    }

    /// Derives the index key for a raw tag name, or `None` when nothing
    /// indexable remains.
    pub fn normalize(&self, raw: &str) -> Option<String> {
        // Lowered per character: a key never depends on neighbouring chars.
        let lowered = raw
            .chars()
            .filter(|ch| !is_unsafe_char(*ch))
            .flat_map(char::to_lowercase);
        let mut out = String::with_capacity(raw.len());
        for ch in lowered {
            if self.is_delimiter(ch) {
                if !out.ends_with('_') {
                    out.push('_');
                }
            } else if self.is_letter(ch) {
                out.push(ch);
            }
        }

        let truncated: String = out.trim_matches('_').chars().take(MAX_INAME_LEN).collect();
        // Truncation may leave a separator at the end; trimming again keeps
        // the output a fixed point of this function.
        let key = truncated.trim_end_matches('_');
        if key.is_empty() {
            None
        } else {
            Some(key.to_string())
        }
    }
}

/// Index key under the default alphabet.
pub fn normalize_tag(raw: &str) -> Option<String> {
    static DEFAULT: OnceLock<TagAlphabet> = OnceLock::new();
    DEFAULT.get_or_init(TagAlphabet::default).normalize(raw)
}

/// Cleans a user-supplied display name: drops control and invisible
/// formatting characters, collapses whitespace runs into one space and trims.
pub fn normalize_display_name(raw: &str) -> String {
    let cleaned: String = raw.chars().filter(|ch| !is_unsafe_char(*ch)).collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_unsafe_char(ch: char) -> bool {
    (ch.is_control() && !ch.is_whitespace())
        || matches!(
            ch,
            '\u{00AD}'
                | '\u{200B}'..='\u{200F}'
                | '\u{202A}'..='\u{202E}'
                | '\u{2060}'..='\u{2064}'
                | '\u{FEFF}'
        )
}
