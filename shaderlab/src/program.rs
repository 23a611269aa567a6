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

use log::{debug, trace};
use regex::Regex;

use crate::scanner::token::{CHR_QUOTE, STR_INCLUDE};
use crate::tree::Block;

/// Splits `code` into lines and removes the indentation shared by every non blank line.
///
/// Tabs count as a single space. Every line loses its trailing whitespace; blank lines
/// become empty and do not take part in the computation of the common indentation.
pub fn unindent(code: &str) -> Vec<String>
{
    let lines: Vec<String> = code.split('\n').map(|v| v.replace('\t', " ")).collect();
    let indent = lines
        .iter()
        .filter(|v| !v.trim().is_empty())
        .map(|v| v.len() - v.trim_start_matches(' ').len())
        .min()
        .unwrap_or(0);
    lines
        .into_iter()
        .map(|v| {
            if v.len() > indent && !v.trim().is_empty() {
                v[indent..].trim_end().into()
            } else {
                v.trim_end().into()
            }
        })
        .collect()
}

/// Turns the text located between two program sentinels into program lines.
///
/// The text starts right after the start sentinel: the remainder of that line is only
/// kept when it is not blank.
pub fn program_lines(body: &str) -> Vec<String>
{
    let body = match body.find('\n') {
        Some(pos) if body[..pos].trim().is_empty() => &body[pos + 1..],
        None if body.trim().is_empty() => "",
        _ => body
    };
    if body.is_empty() {
        return Vec::new();
    }
    unindent(body.strip_suffix('\n').unwrap_or(body))
}

/// Returns true if `line` is an `#include "file_path"` directive.
pub fn is_include(line: &str, file_path: &str) -> bool
{
    let trimed = line.trim_start();
    match trimed.get(..STR_INCLUDE.len()) {
        Some(keyword) if keyword.eq_ignore_ascii_case(STR_INCLUDE) => (),
        _ => return false
    }
    let value = trimed[STR_INCLUDE.len()..].trim_start();
    if value.as_bytes().first() != Some(&CHR_QUOTE) {
        return false;
    }
    match value[1..].find(CHR_QUOTE as char) {
        Some(end) => &value[1..end + 1] == file_path,
        None => false
    }
}

fn insert_lines(program: &mut Vec<String>, index: Option<usize>, lines: Vec<String>)
{
    match index {
        Some(index) if index < program.len() => {
            program.splice(index..index, lines);
        },
        _ => program.extend(lines)
    }
}

impl Block
{
    /// Inserts a line in the embedded program; `None` or an index past the end appends.
    ///
    /// A block without a program gets an empty one first.
    pub fn insert_shader_line<T: Into<String>>(&mut self, index: Option<usize>, line: T)
    {
        let program = self.program.get_or_insert_with(Vec::new);
        insert_lines(program, index, vec![line.into()]);
    }

    /// Inserts a multi-line snippet in the embedded program, after removing its indentation.
    pub fn insert_shader_code(&mut self, index: Option<usize>, code: &str)
    {
        let lines = unindent(code);
        trace!("Inserting {} line(s) of shader code at {:?}", lines.len(), index);
        let program = self.program.get_or_insert_with(Vec::new);
        insert_lines(program, index, lines);
    }

    /// Removes every program line containing `pattern`; returns the number of lines removed.
    pub fn remove_shader_code_containing(&mut self, pattern: &str) -> usize
    {
        match &mut self.program {
            Some(program) => {
                let len = program.len();
                program.retain(|v| !v.contains(pattern));
                len - program.len()
            },
            None => 0
        }
    }

    /// Replaces the first `#include "file_path"` line of the program with the lines of
    /// `content`. Returns false, leaving the block untouched, when there is no such line.
    pub fn replace_include(&mut self, file_path: &str, content: &str) -> bool
    {
        let program = match &mut self.program {
            Some(v) => v,
            None => return false
        };
        match program.iter().position(|v| is_include(v, file_path)) {
            Some(index) => {
                program.splice(index..index + 1, unindent(content));
                debug!("Replaced include \"{}\" at line {}", file_path, index);
                true
            },
            None => false
        }
    }

    /// Index of the first program line matching `pattern`.
    pub fn index_of_line_matching(&self, pattern: &Regex) -> Option<usize>
    {
        self.program.as_ref()?.iter().position(|v| pattern.is_match(v))
    }
}

#[cfg(test)]
mod tests
{
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn unindent_basic()
    {
        let lines = unindent("        foo\n\n            bar  \n\t\t\t\t\t\t\t\tbaz\n        ");
        assert_eq!(lines, vec!["foo", "", "    bar", "baz", ""]);
    }

    #[test]
    fn unindent_no_common_indent()
    {
        assert_eq!(unindent("a\n  b"), vec!["a", "  b"]);
        assert_eq!(unindent("bar_body"), vec!["bar_body"]);
    }

    #[test]
    fn program_lines_trim_sentinel_lines()
    {
        assert_eq!(program_lines("\nfoo\n"), vec!["foo"]);
        assert_eq!(program_lines("   \n    #pragma a\n        b;\n"), vec!["#pragma a", "    b;"]);
        assert_eq!(program_lines(" // trailing\n  x\n"), vec!["// trailing", " x"]);
        assert_eq!(program_lines("\n"), Vec::<String>::new());
        assert_eq!(program_lines("\n\n"), vec![""]);
    }

    #[test]
    fn include_detection()
    {
        assert!(is_include("#include \"foo.hlsl\"", "foo.hlsl"));
        assert!(is_include("\t  #INCLUDE   \"foo.hlsl\" // comment", "foo.hlsl"));
        assert!(!is_include("#include \"foo.hlsl.bak\"", "foo.hlsl"));
        assert!(!is_include("#include <foo.hlsl>", "foo.hlsl"));
        assert!(!is_include("#include \"foo.hlsl", "foo.hlsl"));
        assert!(!is_include("// #include \"foo.hlsl\"", "foo.hlsl"));
        assert!(!is_include("#inc", "foo.hlsl"));
    }

    fn block(lines: &[&str]) -> Block
    {
        let mut block = Block::new();
        block.set_program(Some(lines.iter().map(|v| v.to_string()).collect()));
        block
    }

    #[test]
    fn insert_lines_and_code()
    {
        let mut b = block(&["a", "b"]);
        b.insert_shader_line(Some(0), "first");
        b.insert_shader_line(None, "last");
        b.insert_shader_line(Some(100), "after");
        b.insert_shader_code(Some(1), "    x\n        y");
        assert_eq!(b.program().unwrap(), ["first", "x", "    y", "a", "b", "last", "after"]);
        let mut empty = Block::new();
        empty.insert_shader_line(Some(3), "#define X 1");
        assert_eq!(empty.program().unwrap(), ["#define X 1"]);
    }

    #[test]
    fn remove_containing()
    {
        let mut b = block(&["#pragma shader_feature_local _A", "x", "#pragma shader_feature_local _B"]);
        assert_eq!(b.remove_shader_code_containing("shader_feature_local"), 2);
        assert_eq!(b.program().unwrap(), ["x"]);
        assert_eq!(Block::new().remove_shader_code_containing("x"), 0);
    }

    #[test]
    fn replace_include()
    {
        let mut b = block(&["a", "    #include \"foo.hlsl\"", "#include \"foo.hlsl\""]);
        assert!(b.replace_include("foo.hlsl", "  bar_body\n    more"));
        assert_eq!(b.program().unwrap(), ["a", "bar_body", "  more", "#include \"foo.hlsl\""]);
    }

    #[test]
    fn replace_missing_include_is_noop()
    {
        let mut b = block(&["#include \"other.hlsl\""]);
        assert!(!b.replace_include("foo.hlsl", "bar_body"));
        assert_eq!(b.program().unwrap(), ["#include \"other.hlsl\""]);
        let mut empty = Block::new();
        assert!(!empty.replace_include("foo.hlsl", "bar_body"));
        assert_eq!(empty.program(), None);
    }

    #[test]
    fn line_matching()
    {
        let b = block(&["a", "  #include \"Packages/ShaderPass/ShaderPassForward.hlsl\"", "c"]);
        let re = Regex::new(r#"\s*#include\s*"Packages/ShaderPass/ShaderPass.*\.hlsl"\s*"#).unwrap();
        assert_eq!(b.index_of_line_matching(&re), Some(1));
        assert_eq!(Block::new().index_of_line_matching(&re), None);
    }

    proptest! {
        #[test]
        fn unindent_is_idempotent(lines in proptest::collection::vec("[ \t]{0,6}[a-z#;]{0,6}[ ]{0,2}", 1..8))
        {
            let once = unindent(&lines.join("\n"));
            let twice = unindent(&once.join("\n"));
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn unindent_keeps_relative_indent(indent in 0usize..8, lines in proptest::collection::vec("[ ]{0,4}[a-z]{1,6}", 1..8))
        {
            let prefix = " ".repeat(indent);
            let shifted: Vec<String> = lines.iter().map(|v| format!("{}{}", prefix, v)).collect();
            prop_assert_eq!(unindent(&shifted.join("\n")), unindent(&lines.join("\n")));
        }
    }
}
