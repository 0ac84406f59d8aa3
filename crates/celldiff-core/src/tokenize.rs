//! Delimiter-based splitting of cell content into tokens

use crate::error::Result;
use regex::Regex;

/// Splits cell text into trimmed, non-empty tokens
///
/// Built once per comparison from the user-supplied delimiter string. Every
/// individual character of the set is a literal single-character separator;
/// characters are escaped before being joined into one alternation so regex
/// metacharacters in user input match literally. Line breaks always separate,
/// whether or not the set names them. An empty (or whitespace-only) delimiter
/// string falls back to splitting on line breaks alone.
#[derive(Debug, Clone)]
pub struct Splitter {
    pattern: Option<Regex>,
}

impl Splitter {
    /// Build a splitter from a delimiter string
    pub fn new(delimiters: &str) -> Result<Self> {
        if delimiters.trim().is_empty() {
            return Ok(Self { pattern: None });
        }

        // CRLF first so it is consumed as a single separator
        let mut alternates = vec![String::from(r"\r\n")];
        alternates.extend(delimiters.chars().map(|c| regex::escape(&c.to_string())));
        alternates.push(String::from(r"[\r\n]"));

        let pattern = Regex::new(&alternates.join("|"))?;
        Ok(Self {
            pattern: Some(pattern),
        })
    }

    /// Split `content` into tokens
    ///
    /// Pieces are trimmed; empty and whitespace-only pieces are dropped.
    /// Ordering follows the order of appearance in the source text and
    /// duplicates are retained.
    pub fn split(&self, content: &str) -> Vec<String> {
        let pieces: Vec<&str> = match &self.pattern {
            None => content.lines().collect(),
            Some(re) => re.split(content).collect(),
        };

        pieces
            .into_iter()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect()
    }
}
