//! Document Management
//!
//! Open Wollok files as the editor sees them, with incremental updates.

use ropey::Rope;
use tower_lsp::lsp_types::*;

/// Wollok source file extensions the server handles.
pub const WOLLOK_EXTENSIONS: &[&str] = &["wlk", "wpgm", "wtest"];

/// An open text document in the editor.
#[derive(Debug, Clone)]
pub struct Document {
    uri: Url,
    /// Increments on each change.
    version: i32,
    content: Rope,
}

impl Document {
    pub fn new(uri: Url, version: i32, text: String) -> Self {
        Self {
            uri,
            version,
            content: Rope::from_str(&text),
        }
    }

    pub fn uri(&self) -> &Url {
        &self.uri
    }

    /// Name the file is known by in the program environment.
    pub fn file_name(&self) -> &str {
        self.uri.as_str()
    }

    pub fn version(&self) -> i32 {
        self.version
    }

    /// Returns the full document text.
    pub fn text(&self) -> String {
        self.content.to_string()
    }

    pub fn line_count(&self) -> usize {
        self.content.len_lines()
    }

    /// Returns the text of a line, without its line break.
    pub fn line(&self, line_idx: usize) -> Option<String> {
        if line_idx < self.content.len_lines() {
            let line = self.content.line(line_idx).to_string();
            Some(line.trim_end_matches(['\n', '\r']).to_string())
        } else {
            None
        }
    }

    /// Whether this is a `.wtest` file.
    pub fn is_test_file(&self) -> bool {
        self.uri.path().ends_with(".wtest")
    }

    /// Whether this is a `.wpgm` file.
    pub fn is_program_file(&self) -> bool {
        self.uri.path().ends_with(".wpgm")
    }

    /// Applies a text change to the document.
    pub fn apply_change(&mut self, version: i32, change: TextDocumentContentChangeEvent) {
        self.version = version;

        match change.range {
            Some(range) => {
                let start_offset = self.position_to_offset(range.start);
                let end_offset = self.position_to_offset(range.end);

                if let (Some(start), Some(end)) = (start_offset, end_offset) {
                    let start = self.content.byte_to_char(start);
                    let end = self.content.byte_to_char(end);
                    self.content.remove(start..end);
                    self.content.insert(start, &change.text);
                }
            }
            None => {
                self.content = Rope::from_str(&change.text);
            }
        }
    }

    /// Converts an LSP position to a byte offset.
    pub fn position_to_offset(&self, position: Position) -> Option<usize> {
        let line_idx = position.line as usize;
        if line_idx >= self.content.len_lines() {
            return None;
        }

        let line_start = self.content.line_to_char(line_idx);
        let line_len = self.content.line(line_idx).len_chars();
        let char_idx = (position.character as usize).min(line_len);

        Some(self.content.char_to_byte(line_start + char_idx))
    }

    /// Converts a byte offset to an LSP position.
    pub fn offset_to_position(&self, offset: usize) -> Position {
        let char_idx = self.content.byte_to_char(offset.min(self.content.len_bytes()));
        let line_idx = self.content.char_to_line(char_idx);
        let line_start = self.content.line_to_char(line_idx);

        Position {
            line: line_idx as u32,
            character: (char_idx - line_start) as u32,
        }
    }

    /// The character right before `position`, if any.
    pub fn char_before(&self, position: Position) -> Option<char> {
        let offset = self.position_to_offset(position)?;
        let char_idx = self.content.byte_to_char(offset);
        char_idx.checked_sub(1).map(|idx| self.content.char(idx))
    }
}

/// Whether a URI names a Wollok source file.
pub fn is_wollok_file(uri: &Url) -> bool {
    uri.path()
        .rsplit_once('.')
        .is_some_and(|(_, ext)| WOLLOK_EXTENSIONS.contains(&ext))
}
