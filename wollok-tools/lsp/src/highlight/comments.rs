//! Comment Scanner
//!
//! Finds `//` line comments and `/* */` block comments in raw document
//! lines, independently of the program graph.
//!
//! A block comment produces one token per physical line it covers. Several
//! comment regions may share a line; the scanner keeps consuming the rest of
//! the line after each region ends. A block comment still open at the end of
//! the document runs to the end of the document. Nesting is not recognized:
//! the earliest marker on the line wins.

use super::lines::{find, Lines};
use super::token::{emit, Token, TokenCategory};

const LINE_COMMENT: &str = "//";
const BLOCK_OPEN: &str = "/*";
const BLOCK_CLOSE: &str = "*/";

#[derive(Debug)]
enum ScanState {
    Normal,
    /// Tokens of the block comment found so far, flushed when it closes.
    InBlockComment { pending: Vec<Token> },
}

struct CommentScanner {
    state: ScanState,
    tokens: Vec<Token>,
}

impl CommentScanner {
    fn new() -> Self {
        Self {
            state: ScanState::Normal,
            tokens: Vec::new(),
        }
    }

    fn scan_line(&mut self, line_index: u32, line: &str) {
        let length = line.chars().count() as u32;
        // Column where the current region starts on this line.
        let mut segment_start = 0u32;
        // Characters of the line already consumed.
        let mut offset = 0u32;

        loop {
            let rest = rest_of(line, offset);

            match &mut self.state {
                ScanState::InBlockComment { pending } => match find(rest, BLOCK_CLOSE) {
                    Some(close) => {
                        let end = offset + close + BLOCK_CLOSE.len() as u32;
                        push_span(pending, line_index, segment_start, end);
                        let pending = std::mem::take(pending);
                        self.tokens.extend(pending);
                        self.state = ScanState::Normal;
                        offset = end;
                    }
                    None => {
                        push_span(pending, line_index, segment_start, length);
                        return;
                    }
                },
                ScanState::Normal => {
                    let line_comment = find(rest, LINE_COMMENT);
                    let block = find(rest, BLOCK_OPEN);

                    match (line_comment, block) {
                        (Some(marker), block) if block.map_or(true, |open| marker < open) => {
                            let column = offset + marker;
                            self.tokens.push(emit(
                                line_index,
                                column,
                                length - column,
                                TokenCategory::Comment,
                            ));
                            return;
                        }
                        (_, Some(open)) => {
                            segment_start = offset + open;
                            offset = segment_start + BLOCK_OPEN.len() as u32;
                            self.state = ScanState::InBlockComment {
                                pending: Vec::new(),
                            };
                        }
                        _ => return,
                    }
                }
            }
        }
    }

    fn finish(mut self) -> Vec<Token> {
        if let ScanState::InBlockComment { pending } = self.state {
            self.tokens.extend(pending);
        }
        self.tokens
    }
}

fn rest_of(line: &str, offset: u32) -> &str {
    let start = line
        .char_indices()
        .nth(offset as usize)
        .map_or(line.len(), |(byte, _)| byte);
    &line[start..]
}

fn push_span(pending: &mut Vec<Token>, line: u32, start: u32, end: u32) {
    if end > start {
        pending.push(emit(line, start, end - start, TokenCategory::Comment));
    }
}

/// Comment tokens for a whole document, in line order.
pub fn process_comments(lines: &Lines<'_>) -> Vec<Token> {
    let mut scanner = CommentScanner::new();
    for (index, line) in lines.iter().enumerate() {
        scanner.scan_line(index as u32, line);
    }
    scanner.finish()
}
