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

use std::fmt::{Display, Formatter};

use crate::scanner::token::Sentinel;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type
{
    /// The first statement of the document is not `Shader`.
    MissingShader(String),
    /// A block keyword is not followed by a `{ ... }` body.
    MissingBlock(String),
    /// A block body is never closed.
    UnterminatedBlock(String),
    /// No end sentinel was found for an embedded program.
    UnterminatedProgram(Sentinel),
    /// A `Tags { ... }` clause does not alternate between keys and values.
    MalformedTags,
    Eof
}

impl Display for Type
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result
    {
        match self {
            Type::MissingShader(found) => write!(f, "expected 'Shader' at document start (got '{}')", found),
            Type::MissingBlock(keyword) => write!(f, "missing block after '{}'", keyword),
            Type::UnterminatedBlock(keyword) => write!(f, "unterminated block '{}'", keyword),
            Type::UnterminatedProgram(sentinel) => write!(f, "no matching {} for {}", sentinel.end_name(), sentinel),
            Type::MalformedTags => f.write_str("malformed Tags block (expected \"key\" = \"value\" pairs)"),
            Type::Eof => f.write_str("unexpected EOF")
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error
{
    pub line: usize,
    pub col: usize,
    pub etype: Type
}

impl Error
{
    pub fn new(line: usize, col: usize, etype: Type) -> Self
    {
        Self { line, col, etype }
    }

    /// Builds an error located at the byte `offset` of `document` (1-based line and column).
    pub fn at(document: &str, offset: usize, etype: Type) -> Self
    {
        let offset = offset.min(document.len());
        let head = &document.as_bytes()[..offset];
        let line = head.iter().filter(|&&c| c == b'\n').count() + 1;
        let line_start = head.iter().rposition(|&c| c == b'\n').map(|v| v + 1).unwrap_or(0);
        Self::new(line, offset - line_start + 1, etype)
    }

    /// A malformed child block which its parent may drop instead of failing the whole document.
    pub fn is_recoverable(&self) -> bool
    {
        matches!(self.etype, Type::MissingBlock(_) | Type::UnterminatedBlock(_))
    }
}

impl Display for Error
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result
    {
        write!(f, "{}:{} {}", self.line, self.col, self.etype)
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn position()
    {
        let doc = "Shader \"A\"\n{\n  Pass";
        let err = Error::at(doc, doc.len() - 4, Type::MissingBlock("Pass".into()));
        assert_eq!((err.line, err.col), (3, 3));
        assert_eq!(err.to_string(), "3:3 missing block after 'Pass'");
        let err = Error::at(doc, 0, Type::Eof);
        assert_eq!((err.line, err.col), (1, 1));
    }

    #[test]
    fn recoverable()
    {
        assert!(Error::new(1, 1, Type::MissingBlock("Pass".into())).is_recoverable());
        assert!(!Error::new(1, 1, Type::UnterminatedProgram(Sentinel::HlslProgram)).is_recoverable());
        assert!(!Error::new(1, 1, Type::MalformedTags).is_recoverable());
    }
}
