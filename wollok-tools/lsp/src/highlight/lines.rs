//! Line Indexer
//!
//! Maps node source positions onto the document's lines and locates the
//! exact sub-token (keyword, identifier, operator) a token should cover.
//!
//! Columns are counted in characters. Node positions are 1-based; everything
//! returned from here is 0-based.

use wollok_model::Node;

use super::ClassifyError;

/// A 0-based position where a node's source text starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchor {
    pub line: u32,
    pub column: u32,
}

impl Anchor {
    /// Returns the declaration position of a node, or `None` for nodes
    /// without a source map.
    pub fn of(node: &Node) -> Option<Self> {
        let start = node.source_map?.start;
        Some(Self {
            line: start.line.saturating_sub(1),
            column: start.column.saturating_sub(1),
        })
    }
}

/// The document text split into lines, indexed from 0.
#[derive(Debug, Clone)]
pub struct Lines<'a> {
    lines: Vec<&'a str>,
}

impl<'a> Lines<'a> {
    /// Splits a document on `\n`, dropping a trailing `\r` from each line.
    pub fn new(text: &'a str) -> Self {
        Self {
            lines: text
                .split('\n')
                .map(|line| line.strip_suffix('\r').unwrap_or(line))
                .collect(),
        }
    }

    pub fn from_lines(lines: Vec<&'a str>) -> Self {
        Self { lines }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn get(&self, line: u32) -> Option<&'a str> {
        self.lines.get(line as usize).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.lines.iter().copied()
    }

    /// The rest of the anchor's line, starting at its column.
    pub fn word_at(&self, anchor: Anchor) -> Result<&'a str, ClassifyError> {
        let line = self.get(anchor.line).ok_or(ClassifyError::LineOutOfRange {
            line: anchor.line,
            count: self.lines.len(),
        })?;
        let start = line
            .char_indices()
            .nth(anchor.column as usize)
            .map_or(line.len(), |(byte, _)| byte);
        Ok(&line[start..])
    }

    /// Column of the first occurrence of `needle` at or after the anchor.
    ///
    /// Identifier-like needles only match on word boundaries, so `fly` is not
    /// found inside `flying`.
    pub fn locate(&self, anchor: Anchor, needle: &str) -> Result<u32, ClassifyError> {
        let word = self.word_at(anchor)?;
        let offset = find(word, needle).ok_or_else(|| ClassifyError::TokenNotFound {
            token: needle.to_string(),
            line: anchor.line,
        })?;
        Ok(anchor.column + offset)
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn is_identifier_like(needle: &str) -> bool {
    match (needle.chars().next(), needle.chars().last()) {
        (Some(first), Some(last)) => is_word_char(first) && is_word_char(last),
        _ => false,
    }
}

/// Character offset of `needle` inside `haystack`.
pub(crate) fn find(haystack: &str, needle: &str) -> Option<u32> {
    if needle.is_empty() {
        return None;
    }

    let byte = if is_identifier_like(needle) {
        haystack.match_indices(needle).map(|(i, _)| i).find(|&i| {
            let before = haystack[..i].chars().next_back();
            let after = haystack[i + needle.len()..].chars().next();
            !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
        })?
    } else {
        haystack.find(needle)?
    };

    Some(haystack[..byte].chars().count() as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wollok_model::{NodeData, SourceMap};

    #[test]
    fn test_anchor_is_zero_based() {
        let mut node = Node::new(NodeData::Body);
        assert_eq!(Anchor::of(&node), None);

        node.source_map = Some(SourceMap::new((2, 3), (2, 17)));
        assert_eq!(Anchor::of(&node), Some(Anchor { line: 1, column: 2 }));
    }

    #[test]
    fn test_word_at() {
        let lines = Lines::new("class Bird {\r\n  var energy = 0\n}");
        assert_eq!(lines.len(), 3);
        assert_eq!(lines.word_at(Anchor { line: 1, column: 2 }).unwrap(), "var energy = 0");
        assert_eq!(lines.word_at(Anchor { line: 0, column: 40 }).unwrap(), "");
        assert!(matches!(
            lines.word_at(Anchor { line: 5, column: 0 }),
            Err(ClassifyError::LineOutOfRange { line: 5, count: 3 })
        ));
    }

    #[test]
    fn test_locate_respects_word_boundaries() {
        let lines = Lines::from_lines(vec!["method m(flying, fly) = fly + 1"]);
        let anchor = Anchor { line: 0, column: 0 };

        assert_eq!(lines.locate(anchor, "m").unwrap(), 7);
        assert_eq!(lines.locate(anchor, "fly").unwrap(), 17);
        assert_eq!(lines.locate(anchor, "+").unwrap(), 28);
        assert!(matches!(
            lines.locate(anchor, "energy"),
            Err(ClassifyError::TokenNotFound { .. })
        ));
    }

    #[test]
    fn test_columns_count_characters() {
        let lines = Lines::from_lines(vec!["const ñandú = \"ñ\""]);
        let anchor = Anchor { line: 0, column: 0 };

        assert_eq!(lines.locate(anchor, "ñandú").unwrap(), 6);
        assert_eq!(lines.locate(anchor, "\"ñ\"").unwrap(), 14);
    }
}
