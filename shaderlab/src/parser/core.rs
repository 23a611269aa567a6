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

use log::{debug, trace, warn};

use crate::parser::error::{Error, Type};
use crate::program::program_lines;
use crate::scanner::token::{
    check_keyword,
    check_render_state,
    check_stencil_op,
    Keyword,
    CHR_BLOCK_END,
    CHR_BLOCK_START,
    CHR_EQ,
    CHR_NL,
    CHR_QUOTE,
    STR_BLOCK_COMMENT_START,
    STR_LINE_COMMENT,
    STR_PASS,
    STR_SHADER,
    STR_STENCIL,
    STR_SUBSHADER
};
use crate::scanner::{
    find_program_end,
    is_whitespace,
    scan_block,
    scan_parameter,
    scan_quoted,
    skip_block_comment,
    skip_line,
    skip_whitespace,
    Parameter,
    Range,
    ValueKind
};
use crate::tree::{Block, Document, Pass, SubShader, Tags};

fn unquote(value: &str) -> &str
{
    let bytes = value.as_bytes();
    if bytes.len() >= 2 && bytes[0] == CHR_QUOTE && bytes[bytes.len() - 1] == CHR_QUOTE {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

/// Recursive descent parser building a [Document] out of ShaderLab source text.
pub struct Parser<'a>
{
    document: &'a str
}

impl<'a> Parser<'a>
{
    pub fn new(document: &'a str) -> Parser<'a>
    {
        Parser { document }
    }

    fn error(&self, offset: usize, etype: Type) -> Error
    {
        Error::at(self.document, offset, etype)
    }

    /// Next pair of `bounds` which is not a comment.
    fn next_parameter(&self, bounds: Range) -> Option<Parameter>
    {
        let mut cursor = bounds.start;
        loop {
            let param = scan_parameter(self.document, Range::between(cursor, bounds.end()))?;
            if !param.is_comment() {
                return Some(param);
            }
            cursor = param.end();
        }
    }

    /// Range strictly inside the braces of a block value.
    fn block_interior(&self, keyword: &str, param: &Parameter) -> Result<Range, Error>
    {
        if param.kind != ValueKind::Block {
            return Err(self.error(param.name.start, Type::MissingBlock(keyword.into())));
        }
        let value = param.value(self.document).as_bytes();
        if value.len() < 2 || value[value.len() - 1] != CHR_BLOCK_END {
            return Err(self.error(param.value.start, Type::UnterminatedBlock(keyword.into())));
        }
        Ok(Range::between(param.value.start + 1, param.value.end() - 1))
    }

    fn tag_token(&self, pos: usize, end: usize) -> Result<(String, usize), Error>
    {
        let code = self.document.as_bytes();
        if code[pos] == CHR_QUOTE {
            let token_end = scan_quoted(code, pos, end).ok_or_else(|| self.error(pos, Type::MalformedTags))?;
            return Ok((self.document[pos + 1..token_end - 1].into(), token_end));
        }
        let mut token_end = pos;
        while token_end < end && !is_whitespace(code[token_end]) && code[token_end] != CHR_EQ {
            token_end += 1;
        }
        if token_end == pos {
            return Err(self.error(pos, Type::MalformedTags));
        }
        Ok((self.document[pos..token_end].into(), token_end))
    }

    /// Skips whitespace and comments.
    fn skip_space(&self, mut pos: usize, end: usize) -> usize
    {
        let code = self.document.as_bytes();
        loop {
            pos = skip_whitespace(code, pos, end);
            let rest = &self.document[pos..end];
            if rest.starts_with(STR_LINE_COMMENT) {
                pos = skip_line(code, pos, end);
            } else if rest.starts_with(STR_BLOCK_COMMENT_START) {
                pos = skip_block_comment(code, pos + STR_BLOCK_COMMENT_START.len(), end);
            } else {
                return pos;
            }
        }
    }

    /// Skips the remaining bare arguments of an unknown command found on the same line.
    ///
    /// Stops before a line feed, a block, a string, a comment or a known keyword, so
    /// `Blend One Zero Cull Off` only drops `Blend One Zero`.
    fn skip_arguments(&self, mut pos: usize, end: usize) -> usize
    {
        let code = self.document.as_bytes();
        loop {
            let mut start = pos;
            while start < end && code[start] != CHR_NL && is_whitespace(code[start]) {
                start += 1;
            }
            if start >= end || matches!(code[start], CHR_NL | CHR_BLOCK_START | CHR_QUOTE) {
                return pos;
            }
            let rest = &self.document[start..end];
            if rest.starts_with(STR_LINE_COMMENT) || rest.starts_with(STR_BLOCK_COMMENT_START) {
                return pos;
            }
            let mut token_end = start;
            while token_end < end
                && !is_whitespace(code[token_end])
                && !matches!(code[token_end], CHR_BLOCK_START | CHR_QUOTE)
            {
                token_end += 1;
            }
            let token = &self.document[start..token_end];
            if check_keyword(token).is_some() || check_render_state(token).is_some() {
                return pos;
            }
            trace!("Dropping argument '{}'", token);
            pos = token_end;
        }
    }

    /// Parses `{ "key" = "value" ... }` into `tags`.
    fn parse_tags(&self, tags: &mut Tags, param: &Parameter) -> Result<(), Error>
    {
        let code = self.document.as_bytes();
        let value = param.value;
        if param.kind != ValueKind::Block || code[value.start] != CHR_BLOCK_START {
            return Err(self.error(param.name.start, Type::MalformedTags));
        }
        let end = if code[value.end() - 1] == CHR_BLOCK_END && value.len > 1 { value.end() - 1 } else { value.end() };
        let mut pos = value.start + 1;
        loop {
            pos = self.skip_space(pos, end);
            if pos >= end {
                break;
            }
            let (key, next) = self.tag_token(pos, end)?;
            pos = self.skip_space(next, end);
            if pos >= end || code[pos] != CHR_EQ {
                return Err(self.error(pos, Type::MalformedTags));
            }
            pos = self.skip_space(pos + 1, end);
            if pos >= end {
                return Err(self.error(pos, Type::MalformedTags));
            }
            let (value, next) = self.tag_token(pos, end)?;
            trace!("Tag '{}' = '{}'", key, value);
            tags.insert(key, value);
            pos = next;
        }
        Ok(())
    }

    fn parse_stencil(&self, block: &mut Block, param: &Parameter) -> Result<(), Error>
    {
        let inner = match self.block_interior(STR_STENCIL, param) {
            Ok(v) => v,
            Err(e) => {
                warn!("Ignoring Stencil without a block: {}", e);
                return Ok(());
            }
        };
        let mut cursor = inner.start;
        while let Some(field) = scan_parameter(self.document, Range::between(cursor, inner.end())) {
            cursor = field.end();
            if field.is_comment() {
                continue;
            }
            let name = field.name(self.document);
            match check_stencil_op(name) {
                Some(op) if field.kind != ValueKind::Empty => {
                    block.stencil.insert(op, field.value(self.document).into());
                },
                _ => debug!("Ignoring stencil field '{}'", name)
            }
        }
        Ok(())
    }

    /// Stores a pair found in a block body; returns the position where scanning resumes.
    fn parse_content(&self, block: &mut Block, bounds: Range, param: &Parameter) -> Result<usize, Error>
    {
        let name = param.name(self.document);
        match check_keyword(name) {
            Some(Keyword::Program(sentinel)) => {
                let body = find_program_end(self.document, sentinel, param.value.start, bounds.end())
                    .ok_or_else(|| self.error(param.name.start, Type::UnterminatedProgram(sentinel)))?;
                let lines = program_lines(body.body.slice(self.document));
                debug!("Parsed {} block with {} line(s)", sentinel, lines.len());
                block.program = Some(lines);
                return Ok(body.end);
            },
            Some(Keyword::Tags) => self.parse_tags(&mut block.tags, param)?,
            Some(Keyword::Stencil) => self.parse_stencil(block, param)?,
            _ => match check_render_state(name) {
                Some(state) if param.kind != ValueKind::Empty => {
                    block.parameters.insert(state, param.value(self.document).into());
                },
                _ => {
                    debug!("Ignoring directive '{}'", name);
                    if param.kind == ValueKind::Bare {
                        return Ok(self.skip_arguments(param.end(), bounds.end()));
                    }
                }
            }
        }
        Ok(param.end())
    }

    fn parse_pass(&self, param: &Parameter) -> Result<Pass, Error>
    {
        let bounds = self.block_interior(STR_PASS, param)?;
        let mut pass = Pass::new();
        let mut cursor = bounds.start;
        while let Some(param) = scan_parameter(self.document, Range::between(cursor, bounds.end())) {
            cursor = match check_keyword(param.name(self.document)) {
                _ if param.is_comment() => param.end(),
                Some(Keyword::Name) => {
                    pass.name = Some(unquote(param.value(self.document)).into());
                    param.end()
                },
                _ => self.parse_content(&mut pass.block, bounds, &param)?
            };
        }
        debug!("Parsed pass {:?}", pass.name);
        Ok(pass)
    }

    fn parse_sub_shader(&self, param: &Parameter) -> Result<SubShader, Error>
    {
        let bounds = self.block_interior(STR_SUBSHADER, param)?;
        let mut sub_shader = SubShader::new();
        let mut cursor = bounds.start;
        while let Some(param) = scan_parameter(self.document, Range::between(cursor, bounds.end())) {
            cursor = match check_keyword(param.name(self.document)) {
                _ if param.is_comment() => param.end(),
                Some(Keyword::Pass) => {
                    match self.parse_pass(&param) {
                        Ok(pass) => sub_shader.passes.push(pass),
                        Err(e) if e.is_recoverable() => warn!("Dropping malformed pass: {}", e),
                        Err(e) => return Err(e)
                    }
                    param.end()
                },
                _ => self.parse_content(&mut sub_shader.block, bounds, &param)?
            };
        }
        debug!("Parsed SubShader with {} pass(es)", sub_shader.passes.len());
        Ok(sub_shader)
    }

    /// Parses the whole document. The first statement must be `Shader "<name>" { ... }`.
    pub fn parse(&self) -> Result<Document, Error>
    {
        let code = self.document.as_bytes();
        let header = self
            .next_parameter(Range::new(0, code.len()))
            .ok_or_else(|| self.error(code.len(), Type::Eof))?;
        let keyword = header.name(self.document);
        if check_keyword(keyword) != Some(Keyword::Shader) {
            return Err(self.error(header.name.start, Type::MissingShader(keyword.into())));
        }
        let mut document = Document::default();
        let open = if header.kind == ValueKind::Block {
            header.value.start
        } else {
            document.name = unquote(header.value(self.document)).into();
            let start = self.skip_space(header.end(), code.len());
            if start >= code.len() || code[start] != CHR_BLOCK_START {
                return Err(self.error(start, Type::MissingBlock(STR_SHADER.into())));
            }
            start
        };
        let close = scan_block(code, open, code.len())
            .ok_or_else(|| self.error(open, Type::UnterminatedBlock(STR_SHADER.into())))?;
        let bounds = Range::between(open + 1, close - 1);
        let mut cursor = bounds.start;
        while let Some(param) = scan_parameter(self.document, Range::between(cursor, bounds.end())) {
            cursor = match check_keyword(param.name(self.document)) {
                _ if param.is_comment() => param.end(),
                Some(Keyword::Properties) => param.end(),
                Some(Keyword::SubShader) => {
                    match self.parse_sub_shader(&param) {
                        Ok(sub_shader) => document.sub_shaders.push(sub_shader),
                        Err(e) if e.is_recoverable() => warn!("Dropping malformed SubShader: {}", e),
                        Err(e) => return Err(e)
                    }
                    param.end()
                },
                _ => self.parse_content(&mut document.block, bounds, &param)?
            };
        }
        debug!("Parsed shader '{}' with {} SubShader(s)", document.name, document.sub_shaders.len());
        Ok(document)
    }
}
