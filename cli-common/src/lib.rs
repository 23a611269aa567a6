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

use std::borrow::Cow;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use log::LevelFilter;

pub const OUT_SUFFIX: &str = ".out.shader";

pub fn alloc_verbosity_level(verbosity: u64) {
    match verbosity {
        0 => log::set_max_level(LevelFilter::Error),
        1 => log::set_max_level(LevelFilter::Warn),
        2 => log::set_max_level(LevelFilter::Info),
        3 => log::set_max_level(LevelFilter::Debug),
        _ => log::set_max_level(LevelFilter::Trace),
    };
}

pub fn init_bp3d_logger<F: FnOnce() -> i32>(f: F) {
    //Initialize bp3d-logger
    let res = bp3d_logger::Logger::new().add_stdout().add_file("bp3d-shaderlab").run(f);
    std::process::exit(res);
}

/// Where the result for one input file goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output<'a>
{
    Stdout,
    File(Cow<'a, Path>)
}

/// `<stem>.out.shader` next to `input`.
pub fn default_output(input: &Path) -> PathBuf
{
    let mut name: OsString = input.file_stem().unwrap_or_default().to_owned();
    name.push(OUT_SUFFIX);
    input.with_file_name(name)
}

fn transform_output<'a>(input: &Path, path: &'a Path) -> Cow<'a, Path>
{
    match input.file_name() {
        Some(name) if path.is_dir() => path.join(name).into(),
        _ => path.into()
    }
}

/// Resolves the output of `input` given the value of the `-o` argument.
///
/// A directory receives a file named like the input. Without `-o`, a single input
/// is written to stdout and several inputs are written next to themselves.
pub fn get_out_path<'a>(input: &Path, arg: Option<&'a OsStr>, single_input: bool) -> Output<'a> {
    match arg {
        Some(v) => Output::File(transform_output(input, Path::new(v))),
        None if single_input => Output::Stdout,
        None => Output::File(default_output(input).into())
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn default_names()
    {
        assert_eq!(default_output(Path::new("shaders/Lit.shader")), Path::new("shaders/Lit.out.shader"));
        assert_eq!(default_output(Path::new("Unlit")), Path::new("Unlit.out.shader"));
    }

    #[test]
    fn out_path()
    {
        let input = Path::new("shaders/Lit.shader");
        assert_eq!(get_out_path(input, None, true), Output::Stdout);
        assert_eq!(
            get_out_path(input, None, false),
            Output::File(Cow::Owned(PathBuf::from("shaders/Lit.out.shader")))
        );
        let file = OsStr::new("does-not-exist/result.shader");
        assert_eq!(get_out_path(input, Some(file), true), Output::File(Path::new(file).into()));
        let dir = std::env::temp_dir();
        assert_eq!(
            get_out_path(input, Some(dir.as_os_str()), false),
            Output::File(dir.join("Lit.shader").into())
        );
    }
}
