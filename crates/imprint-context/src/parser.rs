//! `@import` directive extraction.
//!
//! A directive is an `@` that starts a line (after indentation) or follows
//! whitespace, immediately followed by a path:
//!
//! ```text
//! @./security.md                  -> "./security.md"
//! see @rules/style.md, then ...   -> "rules/style.md"
//! @import ~/.claude/shared.md     -> "~/.claude/shared.md"
//! mail me at dev@example.com      -> (nothing)
//! `@not/an/import.md`             -> (nothing, inline code)
//! ```
//!
//! Lines inside ``` fences are verbatim and never yield directives.

use std::collections::VecDeque;

/// Keyword accepted in the `@import <path>` form.
const IMPORT_KEYWORD: &str = "import";

/// Characters trimmed from the end of a path (sentence punctuation).
const TRAILING_PUNCTUATION: &[char] = &[',', ';', ':', '!', '?', ')', ']'];

/// Opening/closing marker of a fenced code block.
const FENCE: &str = "```";

/// One directive found in a document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportReference {
    /// Path as written, without the leading `@`.
    pub path: String,
    /// Byte offset of the `@` in the document.
    pub offset: usize,
    /// Byte length of the whole directive token (`@import <path>` included).
    pub len: usize,
    /// 1-based line number.
    pub line: usize,
}

impl ImportReference {
    /// Byte range of the directive in the document.
    #[must_use]
    pub fn span(&self) -> std::ops::Range<usize> {
        self.offset..self.offset + self.len
    }
}

/// Lazily iterate the directives of `text`, top to bottom.
///
/// Calling `parse` again restarts from the beginning.
#[must_use]
pub fn parse(text: &str) -> ImportDirectives<'_> {
    ImportDirectives {
        rest: text,
        offset: 0,
        line: 0,
        in_fence: false,
        pending: VecDeque::new(),
    }
}

/// Iterator returned by [`parse`]. Scans one line at a time.
#[derive(Clone, Debug)]
pub struct ImportDirectives<'a> {
    rest: &'a str,
    offset: usize,
    line: usize,
    in_fence: bool,
    pending: VecDeque<ImportReference>,
}

impl Iterator for ImportDirectives<'_> {
    type Item = ImportReference;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(reference) = self.pending.pop_front() {
                return Some(reference);
            }
            if self.rest.is_empty() {
                return None;
            }

            let line_len = self.rest.find('\n').map_or(self.rest.len(), |i| i + 1);
            let (raw_line, rest) = self.rest.split_at(line_len);
            let line_start = self.offset;
            self.rest = rest;
            self.offset += line_len;
            self.line += 1;

            let line = raw_line.trim_end_matches(['\n', '\r']);
            if line.trim_start().starts_with(FENCE) {
                self.in_fence = !self.in_fence;
                continue;
            }
            if self.in_fence {
                continue;
            }
            scan_line(line, line_start, self.line, &mut self.pending);
        }
    }
}

/// Collect the directives on one line outside inline code spans.
fn scan_line(line: &str, line_start: usize, line_no: usize, out: &mut VecDeque<ImportReference>) {
    let bytes = line.as_bytes();
    // Length of the backtick run that opened the current code span.
    let mut code_span: Option<usize> = None;
    let mut after_whitespace = true;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'`' {
            let run = bytes[i..].iter().take_while(|&&b| b == b'`').count();
            code_span = match code_span {
                None => Some(run),
                Some(open) if open == run => None,
                still_open => still_open,
            };
            i += run;
            after_whitespace = false;
            continue;
        }

        if code_span.is_none() && after_whitespace && bytes[i] == b'@' {
            if let Some((path, len)) = directive_at(&line[i..]) {
                out.push_back(ImportReference {
                    path,
                    offset: line_start + i,
                    len,
                    line: line_no,
                });
                i += len;
                after_whitespace = false;
                continue;
            }
        }

        let Some(ch) = line[i..].chars().next() else {
            break;
        };
        after_whitespace = ch.is_whitespace();
        i += ch.len_utf8();
    }
}

/// Parse a directive starting at the `@` of `s`.
///
/// Returns the path and the byte length of the directive token.
fn directive_at(s: &str) -> Option<(String, usize)> {
    let rest = &s[1..];
    let token_len = token_end(rest);
    let token = &rest[..token_len];

    if token == IMPORT_KEYWORD {
        let after = &rest[token_len..];
        let gap = after.len() - after.trim_start().len();
        if gap == 0 {
            return None;
        }
        let path_start = token_len + gap;
        let candidate = &rest[path_start..];
        let path = trim_punctuation(&candidate[..token_end(candidate)]);
        return valid_path(path).map(|p| (p.to_owned(), 1 + path_start + p.len()));
    }

    let path = trim_punctuation(token);
    valid_path(path).map(|p| (p.to_owned(), 1 + p.len()))
}

fn token_end(s: &str) -> usize {
    s.find(|c: char| c.is_whitespace() || c == '`')
        .unwrap_or(s.len())
}

/// Strip sentence punctuation. A final `.` goes only when the file name
/// still has an extension without it, so `@a.md.` is `a.md` but `@..` stays.
fn trim_punctuation(path: &str) -> &str {
    let mut path = path.trim_end_matches(TRAILING_PUNCTUATION);
    while let Some(stripped) = path.strip_suffix('.') {
        if !has_extension(stripped) {
            break;
        }
        path = stripped.trim_end_matches(TRAILING_PUNCTUATION);
    }
    path
}

fn has_extension(path: &str) -> bool {
    let name = path.rsplit('/').next().unwrap_or(path);
    name.rfind('.').is_some_and(|dot| dot > 0 && dot + 1 < name.len())
}

fn valid_path(path: &str) -> Option<&str> {
    (!path.is_empty() && !path.starts_with('@')).then_some(path)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
