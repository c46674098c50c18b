//! Search-grammar tokenizer for build filter queries
//!
//! Recognises whitespace separated `key:value`, `!key:value`,
//! `key:[v1, v2]` and `key:"quoted value"` terms. Words without a `:` are
//! free text and are skipped, since filter queries carry no free text.

use once_cell::sync::Lazy;
use regex::Regex;
use std::iter::Peekable;
use std::str::Chars;

use crate::error::{Result, RuleError};

static KEY_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.\-]+$").expect("key pattern is valid"));

/// One `key:value` term of a query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterToken {
    pub key: String,
    pub negated: bool,
    /// Raw value text; a list keeps its surrounding brackets
    pub value: String,
    /// Value was written as a double-quoted string
    pub quoted: bool,
}

impl FilterToken {
    /// Bracketed list value, e.g. `[android,ios]`
    pub fn is_list(&self) -> bool {
        !self.quoted && self.value.starts_with('[') && self.value.ends_with(']')
    }
}

/// Split a query into filter tokens
pub fn tokenize(query: &str) -> Result<Vec<FilterToken>> {
    let mut tokens = Vec::new();
    let mut chars = query.chars().peekable();

    loop {
        skip_whitespace(&mut chars);
        let Some(&first) = chars.peek() else {
            break;
        };

        if first == '"' {
            // Quoted free text
            chars.next();
            read_quoted(&mut chars)?;
            expect_term_end(&mut chars, "quoted text")?;
            continue;
        }

        let negated = first == '!';
        if negated {
            chars.next();
        }

        let mut key = String::new();
        let mut has_colon = false;
        while let Some(&c) = chars.peek() {
            if c.is_whitespace() {
                break;
            }
            chars.next();
            if c == ':' {
                has_colon = true;
                break;
            }
            key.push(c);
        }

        if !has_colon {
            // Free text word, including AND / OR
            continue;
        }

        if key.is_empty() {
            return Err(RuleError::InvalidQuery("filter is missing a key".to_string()));
        }
        if !KEY_PATTERN.is_match(&key) {
            return Err(RuleError::InvalidQuery(format!("invalid filter key '{}'", key)));
        }

        let (value, quoted) = read_value(&mut chars, &key)?;
        tokens.push(FilterToken {
            key,
            negated,
            value,
            quoted,
        });
    }

    Ok(tokens)
}

fn skip_whitespace(chars: &mut Peekable<Chars<'_>>) {
    while chars.peek().is_some_and(|c| c.is_whitespace()) {
        chars.next();
    }
}

fn read_value(chars: &mut Peekable<Chars<'_>>, key: &str) -> Result<(String, bool)> {
    match chars.peek() {
        None => Err(RuleError::InvalidQuery(format!("filter '{}' has no value", key))),
        Some(c) if c.is_whitespace() => {
            Err(RuleError::InvalidQuery(format!("filter '{}' has no value", key)))
        }
        Some('[') => {
            chars.next();
            let mut value = String::from("[");
            loop {
                match chars.next() {
                    Some(']') => break,
                    Some(c) => value.push(c),
                    None => {
                        return Err(RuleError::InvalidQuery(format!(
                            "unterminated list for filter '{}'",
                            key
                        )))
                    }
                }
            }
            value.push(']');
            expect_term_end(chars, key)?;
            Ok((value, false))
        }
        Some('"') => {
            chars.next();
            let value = read_quoted(chars)?;
            expect_term_end(chars, key)?;
            Ok((value, true))
        }
        Some(_) => {
            let mut value = String::new();
            while let Some(&c) = chars.peek() {
                if c.is_whitespace() {
                    break;
                }
                value.push(c);
                chars.next();
            }
            Ok((value, false))
        }
    }
}

/// Read the rest of a double-quoted string; the opening quote is consumed
fn read_quoted(chars: &mut Peekable<Chars<'_>>) -> Result<String> {
    let mut value = String::new();
    loop {
        match chars.next() {
            Some('"') => return Ok(value),
            Some('\\') => match chars.next() {
                Some(escaped) => value.push(escaped),
                None => break,
            },
            Some(c) => value.push(c),
            None => break,
        }
    }
    Err(RuleError::InvalidQuery("unterminated quoted string".to_string()))
}

fn expect_term_end(chars: &mut Peekable<Chars<'_>>, what: &str) -> Result<()> {
    match chars.peek() {
        None => Ok(()),
        Some(c) if c.is_whitespace() => Ok(()),
        Some(c) => Err(RuleError::InvalidQuery(format!(
            "unexpected '{}' after {}",
            c, what
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(key: &str, negated: bool, value: &str) -> FilterToken {
        FilterToken {
            key: key.to_string(),
            negated,
            value: value.to_string(),
            quoted: false,
        }
    }

    #[test]
    fn test_tokenize_simple_terms() {
        let tokens = tokenize("build.platform:android !build.branch:main").unwrap();
        assert_eq!(
            tokens,
            vec![
                token("build.platform", false, "android"),
                token("build.branch", true, "main"),
            ]
        );
    }

    #[test]
    fn test_tokenize_list_with_spaces() {
        let tokens = tokenize("build.platform:[android, ios ]").unwrap();
        assert_eq!(tokens, vec![token("build.platform", false, "[android, ios ]")]);
        assert!(tokens[0].is_list());
    }

    #[test]
    fn test_tokenize_quoted_value() {
        let tokens = tokenize(r#"build.branch:"release \"2\" candidate""#).unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].value, r#"release "2" candidate"#);
        assert!(tokens[0].quoted);
        assert!(!tokens[0].is_list());
    }

    #[test]
    fn test_value_keeps_later_colons() {
        let tokens = tokenize("build.package:com.example:app").unwrap();
        assert_eq!(tokens, vec![token("build.package", false, "com.example:app")]);
    }

    #[test]
    fn test_keys_may_start_with_digit() {
        let tokens = tokenize("12:30 build.branch:main").unwrap();
        assert_eq!(
            tokens,
            vec![token("12", false, "30"), token("build.branch", false, "main")]
        );
    }

    #[test]
    fn test_free_text_skipped() {
        let tokens = tokenize("hello build.platform:ios AND \"some words\"").unwrap();
        assert_eq!(tokens, vec![token("build.platform", false, "ios")]);
    }

    #[test]
    fn test_malformed_queries() {
        for query in [
            "build.platform:[android,ios",
            "build.branch:\"open",
            ":value",
            "!:value",
            "build.platform:",
            "build.platform: ios",
            "bad/key:x",
            "build.platform:[a]b",
        ] {
            assert!(
                matches!(tokenize(query), Err(RuleError::InvalidQuery(_))),
                "expected failure for: {}",
                query
            );
        }
    }

    #[test]
    fn test_empty_query() {
        assert!(tokenize("").unwrap().is_empty());
        assert!(tokenize("  \t ").unwrap().is_empty());
    }
}
