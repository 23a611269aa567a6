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

use crate::scanner::token::{CHR_BLOCK_END, CHR_BLOCK_START};

pub const INDENT: &str = "    ";

/// Line oriented text builder which prefixes every non blank line with the current indentation.
#[derive(Debug, Default, Clone)]
pub struct Writer
{
    buffer: String,
    depth: usize
}

impl Writer
{
    pub fn new() -> Writer
    {
        Writer::default()
    }

    pub fn line<T: AsRef<str>>(&mut self, line: T)
    {
        let line = line.as_ref();
        if !line.is_empty() {
            for _ in 0..self.depth {
                self.buffer.push_str(INDENT);
            }
            self.buffer.push_str(line);
        }
        self.buffer.push('\n');
    }

    pub fn indent(&mut self)
    {
        self.depth += 1;
    }

    pub fn unindent(&mut self)
    {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Writes `keyword` and an opening brace on their own lines, then indents.
    pub fn open_block(&mut self, keyword: &str)
    {
        self.line(keyword);
        self.line((CHR_BLOCK_START as char).to_string());
        self.indent();
    }

    pub fn close_block(&mut self)
    {
        self.unindent();
        self.line((CHR_BLOCK_END as char).to_string());
    }

    pub fn into_inner(self) -> String
    {
        self.buffer
    }
}
