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

use std::path::{Path, PathBuf};

use log::debug;
use thiserror::Error;

use crate::source::SourceReader;
use crate::tree::Document;

#[derive(Debug, Error)]
pub enum LoadError<SourceError: std::error::Error>
{
    #[error("source error: {0}")]
    Source(SourceError),
    #[error("parse error in {0:?} at {1}")]
    Parser(PathBuf, crate::parser::error::Error)
}

/// Reads and parses the shader at `path`; parse errors carry the path of the file.
pub fn load_document<Reader: SourceReader>(reader: &mut Reader, path: &Path) -> Result<Document, LoadError<Reader::Error>>
{
    let text = reader.read_text_file(path).map_err(LoadError::Source)?;
    debug!("Parsing {:?} ({} bytes)", path, text.len());
    Document::parse(&text).map_err(|e| LoadError::Parser(path.into(), e))
}

/// Replaces `#include "include_path"` everywhere in `document` with the content of `file`.
pub fn replace_include_from<Reader: SourceReader>(
    reader: &mut Reader,
    document: &mut Document,
    include_path: &str,
    file: &Path
) -> Result<usize, Reader::Error>
{
    let content = reader.read_text_file(file)?;
    let content = content.trim_end_matches(&['\n', '\r'][..]);
    Ok(document.replace_include(include_path, content))
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::source::MemoryReader;

    #[test]
    fn load_and_include()
    {
        let mut reader = MemoryReader::new();
        reader.insert(
            "a.shader",
            "Shader \"A\" { SubShader { Pass { HLSLPROGRAM\n#include \"lib.hlsl\"\nENDHLSL } } }"
        );
        reader.insert("lib.hlsl", "float4 Lib();\n");
        let mut document = load_document(&mut reader, Path::new("a.shader")).unwrap();
        let count = replace_include_from(&mut reader, &mut document, "lib.hlsl", Path::new("lib.hlsl")).unwrap();
        assert_eq!(count, 1);
        assert_eq!(document.passes().next().unwrap().program().unwrap(), ["float4 Lib();"]);
    }

    #[test]
    fn load_reports_path()
    {
        let mut reader = MemoryReader::new();
        reader.insert("bad.shader", "SubShader { }");
        let err = load_document(&mut reader, Path::new("bad.shader")).unwrap_err();
        assert_eq!(err.to_string(), "parse error in \"bad.shader\" at 1:1 expected 'Shader' at document start (got 'SubShader')");
        assert!(matches!(load_document(&mut reader, Path::new("missing.shader")), Err(LoadError::Source(_))));
    }
}
