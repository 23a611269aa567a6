// Copyright (c) 2021, BlockProject 3D
//
// All rights reserved.
//
// Redistribution and use in source and binary forms, with or without modification,
// are permitted provided that the following conditions are met:
//
//     * Redistributions of source code must retain the above copyright notice,
//       this list of conditions and the following disclaimer.
//     * Redistributions in binary form must reproduce the above copyright notice,
//       this list of conditions and the following disclaimer in the documentation
//       and/or other materials provided with the distribution.
//     * Neither the name of BlockProject 3D nor the names of its contributors
//       may be used to endorse or promote products derived from this software
//       without specific prior written permission.
//
// THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS
// "AS IS" AND ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT
// LIMITED TO, THE IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR
// A PARTICULAR PURPOSE ARE DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT OWNER OR
// CONTRIBUTORS BE LIABLE FOR ANY DIRECT, INDIRECT, INCIDENTAL, SPECIAL,
// EXEMPLARY, OR CONSEQUENTIAL DAMAGES (INCLUDING, BUT NOT LIMITED TO,
// PROCUREMENT OF SUBSTITUTE GOODS OR SERVICES; LOSS OF USE, DATA, OR
// PROFITS; OR BUSINESS INTERRUPTION) HOWEVER CAUSED AND ON ANY THEORY OF
// LIABILITY, WHETHER IN CONTRACT, STRICT LIABILITY, OR TORT (INCLUDING
// NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE USE OF THIS
// SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.

use log::trace;

use crate::scanner::token::{
    check_sentinel,
    Sentinel,
    CHR_BLOCK_END,
    CHR_BLOCK_START,
    CHR_ARRAY_START,
    CHR_ESCAPE,
    CHR_NL,
    CHR_QUOTE,
    STR_BLOCK_COMMENT_END,
    STR_BLOCK_COMMENT_START,
    STR_LINE_COMMENT
};

/// A byte interval of the source document.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Range
{
    pub start: usize,
    pub len: usize
}

impl Range
{
    pub fn new(start: usize, len: usize) -> Range
    {
        Range { start, len }
    }

    pub fn between(start: usize, end: usize) -> Range
    {
        Range {
            start,
            len: end.saturating_sub(start)
        }
    }

    pub fn end(&self) -> usize
    {
        self.start + self.len
    }

    pub fn is_empty(&self) -> bool
    {
        self.len == 0
    }

    pub fn slice<'a>(&self, document: &'a str) -> &'a str
    {
        &document[self.start..self.end()]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueKind
{
    /// `//` or `/* */` comment; the value holds the comment text.
    Comment,
    /// Program start sentinel; the value is empty and starts right after the sentinel.
    Program(Sentinel),
    /// Quoted string, quotes included.
    Quoted,
    /// Brace block, braces included.
    Block,
    /// Whitespace delimited token.
    Bare,
    /// Nothing follows the name before the end of the scanned range.
    Empty
}

/// A `name value` pair found by [scan_parameter].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Parameter
{
    pub name: Range,
    pub value: Range,
    pub kind: ValueKind
}

impl Parameter
{
    pub fn name<'a>(&self, document: &'a str) -> &'a str
    {
        self.name.slice(document)
    }

    pub fn value<'a>(&self, document: &'a str) -> &'a str
    {
        self.value.slice(document)
    }

    /// Position right after the pair; where the next scan must resume.
    pub fn end(&self) -> usize
    {
        self.name.end().max(self.value.end())
    }

    pub fn is_comment(&self) -> bool
    {
        self.kind == ValueKind::Comment
    }
}

pub fn is_whitespace(chr: u8) -> bool
{
    matches!(chr, b'\t' | b' ' | b'\r' | CHR_NL | b'\x0b' | b'\x0c')
}

fn is_name_terminator(chr: u8) -> bool
{
    is_whitespace(chr) || matches!(chr, CHR_BLOCK_START | CHR_QUOTE | CHR_ARRAY_START)
}

fn starts_with_at(code: &[u8], pos: usize, end: usize, pattern: &str) -> bool
{
    let pattern = pattern.as_bytes();
    pos + pattern.len() <= end && &code[pos..pos + pattern.len()] == pattern
}

pub fn skip_whitespace(code: &[u8], mut pos: usize, end: usize) -> usize
{
    while pos < end && is_whitespace(code[pos]) {
        pos += 1;
    }
    pos
}

/// Returns the position right after the next line feed, or `end`.
pub fn skip_line(code: &[u8], mut pos: usize, end: usize) -> usize
{
    while pos < end {
        pos += 1;
        if code[pos - 1] == CHR_NL {
            break;
        }
    }
    pos
}

/// `pos` must point right after the comment opener; returns the position after `*/`, or `end`.
pub fn skip_block_comment(code: &[u8], mut pos: usize, end: usize) -> usize
{
    while pos < end {
        if starts_with_at(code, pos, end, STR_BLOCK_COMMENT_END) {
            return pos + STR_BLOCK_COMMENT_END.len();
        }
        pos += 1;
    }
    end
}

/// Returns the end of the whitespace delimited token starting at `pos`.
pub fn scan_bare(code: &[u8], mut pos: usize, end: usize) -> usize
{
    while pos < end && !is_whitespace(code[pos]) {
        pos += 1;
    }
    pos
}

/// `pos` must point at the opening quote. Returns the position after the closing quote
/// or None if the string is not closed before `end`.
pub fn scan_quoted(code: &[u8], pos: usize, end: usize) -> Option<usize>
{
    let mut escaped = false;
    let mut cur = pos + 1;
    while cur < end {
        let chr = code[cur];
        cur += 1;
        if escaped {
            escaped = false;
        } else if chr == CHR_ESCAPE {
            escaped = true;
        } else if chr == CHR_QUOTE {
            return Some(cur);
        }
    }
    None
}

/// `pos` must point at the opening brace. Returns the position after the matching
/// closing brace or None if the block is not closed before `end`. Braces inside quoted
/// strings and comments are not counted.
pub fn scan_block(code: &[u8], pos: usize, end: usize) -> Option<usize>
{
    let mut depth = 0usize;
    let mut cur = pos;
    while cur < end {
        match code[cur] {
            CHR_QUOTE => {
                cur = scan_quoted(code, cur, end)?;
                continue;
            },
            CHR_BLOCK_START => depth += 1,
            CHR_BLOCK_END => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(cur + 1);
                }
            },
            _ if starts_with_at(code, cur, end, STR_LINE_COMMENT) => {
                cur = skip_line(code, cur, end);
                continue;
            },
            _ if starts_with_at(code, cur, end, STR_BLOCK_COMMENT_START) => {
                cur = skip_block_comment(code, cur + STR_BLOCK_COMMENT_START.len(), end);
                continue;
            },
            _ => ()
        }
        cur += 1;
    }
    None
}

/// Scans `bounds` of `document` for the next `name value` pair.
///
/// Returns None when only whitespace is left, which signals the end of the enclosing block.
/// The value range includes its delimiters (quotes or braces) so it can be re-emitted
/// verbatim. Unterminated quotes or braces extend the value to the end of `bounds`.
pub fn scan_parameter(document: &str, bounds: Range) -> Option<Parameter>
{
    let code = document.as_bytes();
    let end = bounds.end().min(code.len());
    let start = skip_whitespace(code, bounds.start, end);
    if start >= end {
        return None;
    }
    let mut name_end = start + 1;
    while name_end < end && !is_name_terminator(code[name_end]) {
        name_end += 1;
    }
    let name = Range::between(start, name_end);
    if starts_with_at(code, start, end, STR_LINE_COMMENT) {
        let value = Range::between(name_end, skip_line(code, name_end, end));
        return Some(Parameter { name, value, kind: ValueKind::Comment });
    }
    if starts_with_at(code, start, end, STR_BLOCK_COMMENT_START) {
        let value = Range::between(name_end, skip_block_comment(code, start + STR_BLOCK_COMMENT_START.len(), end));
        return Some(Parameter { name, value, kind: ValueKind::Comment });
    }
    if let Some(sentinel) = check_sentinel(name.slice(document)) {
        return Some(Parameter {
            name,
            value: Range::new(name_end, 0),
            kind: ValueKind::Program(sentinel)
        });
    }
    let value_start = skip_whitespace(code, name_end, end);
    let (value_end, kind) = if value_start >= end {
        (value_start, ValueKind::Empty)
    } else {
        match code[value_start] {
            CHR_QUOTE => (scan_quoted(code, value_start, end).unwrap_or(end), ValueKind::Quoted),
            CHR_BLOCK_START => (scan_block(code, value_start, end).unwrap_or(end), ValueKind::Block),
            _ => (scan_bare(code, value_start, end), ValueKind::Bare)
        }
    };
    let param = Parameter {
        name,
        value: Range::between(value_start, value_end),
        kind
    };
    trace!("Scanned parameter '{}' ({:?}) at {}", param.name(document), kind, start);
    Some(param)
}

/// Location of an embedded program body.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProgramBody
{
    /// Text between the start sentinel and the line holding the end sentinel.
    pub body: Range,
    /// Position right after the end sentinel.
    pub end: usize
}

/// Looks for the end sentinel matching `sentinel`, line by line, starting on the line
/// after `from`. The end sentinel must be the first token of its line.
pub fn find_program_end(document: &str, sentinel: Sentinel, from: usize, end: usize) -> Option<ProgramBody>
{
    let code = document.as_bytes();
    let end = end.min(code.len());
    let end_name = sentinel.end_name();
    let mut line_start = skip_line(code, from, end);
    while line_start < end {
        let mut token_start = line_start;
        while token_start < end && code[token_start] != CHR_NL && is_whitespace(code[token_start]) {
            token_start += 1;
        }
        let token_end = scan_bare(code, token_start, end);
        if document[token_start..token_end].eq_ignore_ascii_case(end_name) {
            return Some(ProgramBody {
                body: Range::between(from, line_start),
                end: token_end
            });
        }
        line_start = skip_line(code, token_end, end);
    }
    None
}
