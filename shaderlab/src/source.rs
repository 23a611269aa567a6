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

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Provides the text of shader and include files to the parser.
pub trait SourceReader
{
    type Error: std::error::Error;

    fn read_text_file(&mut self, path: &Path) -> Result<String, Self::Error>;
}

#[derive(Debug, Error)]
pub enum Error
{
    #[error("io error reading {0:?}: {1}")]
    Io(PathBuf, std::io::Error),
    #[error("file not found {0:?}")]
    NotFound(PathBuf)
}

/// Reads files from the local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsReader;

impl SourceReader for FsReader
{
    type Error = Error;

    fn read_text_file(&mut self, path: &Path) -> Result<String, Self::Error>
    {
        std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::NotFound(path.into()),
            _ => Error::Io(path.into(), e)
        })
    }
}

/// In memory file set, mostly useful to feed generated includes.
#[derive(Debug, Default, Clone)]
pub struct MemoryReader
{
    files: HashMap<PathBuf, String>
}

impl MemoryReader
{
    pub fn new() -> MemoryReader
    {
        MemoryReader::default()
    }

    pub fn insert<P: Into<PathBuf>, T: Into<String>>(&mut self, path: P, content: T)
    {
        self.files.insert(path.into(), content.into());
    }
}

impl SourceReader for MemoryReader
{
    type Error = Error;

    fn read_text_file(&mut self, path: &Path) -> Result<String, Self::Error>
    {
        self.files.get(path).cloned().ok_or_else(|| Error::NotFound(path.into()))
    }
}
