//! Text patterns with named placeholders.
//!
//! `"Hello, {{name}}. Can you give me {{thing}}?"` matches
//! `"Hello, Julian. Can you give me apple?"` and captures
//! `name = "Julian"`, `thing = "apple"`.
//!
//! Literal text is matched exactly and each placeholder captures one or more
//! characters. The match may start anywhere in the text. Adjacent
//! placeholders without literal text between them split greedily: the first
//! one takes as much as it can.

use std::fmt;

use regex::Regex;

use crate::error::PatternError;

/// A compiled text pattern.
#[derive(Debug, Clone)]
pub struct TextPattern {
    source: String,
    names: Vec<String>,
    regex: Regex,
}

impl TextPattern {
    pub fn new(pattern: &str) -> Result<Self, PatternError> {
        let mut names = Vec::new();
        let mut expr = String::with_capacity(pattern.len() * 2);
        let mut literal = String::new();
        let mut rest = pattern;

        while let Some(start) = rest.find("{{") {
            let after = &rest[start + 2..];
            match after.find("}}").filter(|&end| is_placeholder_name(&after[..end])) {
                Some(end) => {
                    literal.push_str(&rest[..start]);
                    expr.push_str(&regex::escape(&literal));
                    expr.push_str("(.+)");
                    literal.clear();
                    names.push(after[..end].to_string());
                    rest = &after[end + 2..];
                }
                None => {
                    // Not a placeholder, keep the braces as literal text
                    literal.push_str(&rest[..start + 2]);
                    rest = after;
                }
            }
        }
        literal.push_str(rest);
        expr.push_str(&regex::escape(&literal));

        let regex = Regex::new(&expr).map_err(|source| PatternError::Invalid {
            pattern: pattern.to_string(),
            source,
        })?;

        Ok(Self {
            source: pattern.to_string(),
            names,
            regex,
        })
    }

    /// Placeholder names in declaration order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// Matches `text` and returns `(name, value)` pairs in declaration order.
    pub fn captures(&self, text: &str) -> Option<Vec<(String, String)>> {
        let caps = self.regex.captures(text)?;
        Some(
            self.names
                .iter()
                .enumerate()
                .filter_map(|(i, name)| {
                    caps.get(i + 1)
                        .map(|m| (name.clone(), m.as_str().to_string()))
                })
                .collect(),
        )
    }
}

fn is_placeholder_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl fmt::Display for TextPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl std::str::FromStr for TextPattern {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}
