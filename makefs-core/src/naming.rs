use crate::error::{FsdataError, Result};
use std::collections::HashSet;

/// Symbol used when a qualified name normalizes to nothing at all.
const FALLBACK_NAME: &str = "file";

/// Collision suffixes are tried up to this bound before giving up.
const MAX_SUFFIX: u32 = 999;

/// Issues unique C identifiers for qualified names within one run.
#[derive(Debug, Default)]
pub struct SymbolTable {
    used: HashSet<String>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map a qualified name to a unique identifier: every character that is
    /// not alphanumeric or underscore becomes underscore, and an already
    /// issued base gets the smallest free numeric suffix.
    pub fn issue(&mut self, qualified_name: &str) -> Result<String> {
        let mut base: String = qualified_name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
            .collect();
        if base.is_empty() {
            base = FALLBACK_NAME.to_string();
        }

        if self.used.insert(base.clone()) {
            return Ok(base);
        }
        for n in 1..=MAX_SUFFIX {
            let candidate = format!("{base}{n}");
            if self.used.insert(candidate.clone()) {
                return Ok(candidate);
            }
        }
        Err(FsdataError::NamingExhausted(qualified_name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_non_identifier_characters() {
        let mut t = SymbolTable::new();
        assert_eq!(t.issue("/img/logo-v2.png").unwrap(), "_img_logo_v2_png");
    }

    #[test]
    fn collisions_get_numeric_suffixes() {
        let mut t = SymbolTable::new();
        assert_eq!(t.issue("/a.txt").unwrap(), "_a_txt");
        assert_eq!(t.issue("/a_txt").unwrap(), "_a_txt1");
        assert_eq!(t.issue("/a-txt").unwrap(), "_a_txt2");
    }

    #[test]
    fn empty_name_uses_fallback() {
        let mut t = SymbolTable::new();
        assert_eq!(t.issue("").unwrap(), "file");
        assert_eq!(t.issue("").unwrap(), "file1");
    }

    #[test]
    fn exhaustion_is_an_error() {
        let mut t = SymbolTable::new();
        for _ in 0..=MAX_SUFFIX {
            t.issue("/x").unwrap();
        }
        let err = t.issue("/x").unwrap_err();
        assert!(matches!(err, FsdataError::NamingExhausted(_)));
    }
}
