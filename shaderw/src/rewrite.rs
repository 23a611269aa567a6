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
use std::ffi::OsStr;
use std::io::Write;
use std::path::{Path, PathBuf};
use bp3d_shaderlab::source::{self, FsReader, SourceReader};
use bp3d_shaderlab::{load_document, replace_include_from, Document, LoadError};
use bp3d_threads::{ScopedThreadManager, ThreadPool};
use cli_common::{get_out_path, Output};
use log::{debug, error, info, warn};
use regex::Regex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("io error writing {0:?}: {1}")]
    Io(PathBuf, std::io::Error),
    #[error("{0}")]
    Load(LoadError<source::Error>),
    #[error("source error: {0}")]
    Source(source::Error),
    #[error("invalid argument '{0}': {1}")]
    InvalidArgument(String, &'static str),
    #[error("a worker thread panicked")]
    WorkerPanic,
    #[error("{0} shader(s) could not be processed")]
    Failed(usize)
}

/// Splits a `NAME=VALUE` argument at the first `=`.
pub fn parse_pair(arg: &str) -> Result<(&str, &str), Error> {
    match arg.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name, value)),
        _ => Err(Error::InvalidArgument(arg.into(), "expected NAME=VALUE"))
    }
}

/// Splits a `PATTERN=FILE` argument at the last `=` and compiles the pattern.
pub fn parse_pattern(arg: &str) -> Result<(Regex, PathBuf), Error> {
    let (pattern, file) = arg.rsplit_once('=')
        .filter(|(_, file)| !file.is_empty())
        .ok_or_else(|| Error::InvalidArgument(arg.into(), "expected PATTERN=FILE"))?;
    let regex = Regex::new(pattern)
        .map_err(|_| Error::InvalidArgument(arg.into(), "invalid regular expression"))?;
    Ok((regex, file.into()))
}

/// Turns `NAME[=VALUE]` into a `#define` line.
pub fn parse_define(arg: &str) -> Result<String, Error> {
    let (name, value) = arg.split_once('=').unwrap_or((arg, ""));
    if name.is_empty() || name.contains(char::is_whitespace) {
        return Err(Error::InvalidArgument(arg.into(), "expected NAME[=VALUE]"));
    }
    if value.is_empty() {
        Ok(format!("#define {}", name))
    } else {
        Ok(format!("#define {} {}", name, value))
    }
}

/// Rewrite operations, applied to every document in declaration order of the fields.
#[derive(Debug)]
pub struct Operations {
    pub remove_passes: Vec<String>,
    pub strip: Vec<String>,
    /// Lines inserted at the top of every pass program, in order.
    pub defines: Vec<String>,
    /// Code inserted before the first program line matching the pattern, in every pass.
    pub insert_before: Vec<(Regex, PathBuf)>,
    pub includes: Vec<(String, PathBuf)>,
    /// Tags added to every SubShader.
    pub tags: Vec<(String, String)>,
    pub variables: HashMap<String, String>,
    pub include_name: bool
}

impl Operations {
    pub fn new() -> Operations {
        Operations {
            remove_passes: Vec::new(),
            strip: Vec::new(),
            defines: Vec::new(),
            insert_before: Vec::new(),
            includes: Vec::new(),
            tags: Vec::new(),
            variables: HashMap::new(),
            include_name: true
        }
    }

    pub fn apply<R: SourceReader<Error = source::Error>>(&self, reader: &mut R, document: &mut Document) -> Result<(), Error> {
        for name in &self.remove_passes {
            if document.remove_pass(name) == 0 {
                warn!("No pass named '{}' in shader '{}'", name, document.name());
            }
        }
        for pattern in &self.strip {
            let count = document.remove_shader_code_in_each_pass_containing(pattern);
            debug!("Stripped {} line(s) containing '{}'", count, pattern);
        }
        for (index, line) in self.defines.iter().enumerate() {
            document.insert_shader_line_in_each_pass(Some(index), line);
        }
        for (pattern, file) in &self.insert_before {
            let code = reader.read_text_file(file).map_err(Error::Source)?;
            let code = code.trim_end_matches(&['\n', '\r'][..]);
            for pass in document.passes_mut() {
                match pass.index_of_line_matching(pattern) {
                    Some(index) => pass.insert_shader_code(Some(index), code),
                    None => debug!("No line matching '{}' in pass {:?}", pattern, pass.name())
                }
            }
        }
        for (include, file) in &self.includes {
            if replace_include_from(reader, document, include, file).map_err(Error::Source)? == 0 {
                warn!("Include \"{}\" not found in shader '{}'", include, document.name());
            }
        }
        for sub_shader in document.sub_shaders_mut() {
            for (key, value) in &self.tags {
                sub_shader.add_tag(key.as_str(), value.as_str());
            }
        }
        if !self.variables.is_empty() {
            document.replace_parameter_variables(&self.variables);
        }
        Ok(())
    }

    pub fn render(&self, document: &Document) -> String {
        document.to_string_with_name(self.include_name)
    }
}

pub struct Config<'a> {
    pub n_threads: usize,
    pub output: Option<&'a OsStr>,
    pub shaders: Vec<&'a Path>,
    pub operations: Operations
}

fn rewrite_single(shader: &Path, output: Output, operations: &Operations) -> Result<(), Error> {
    let mut reader = FsReader;
    let mut document = load_document(&mut reader, shader).map_err(Error::Load)?;
    operations.apply(&mut reader, &mut document)?;
    let text = operations.render(&document);
    match output {
        Output::Stdout => std::io::stdout().lock().write_all(text.as_bytes())
            .map_err(|e| Error::Io(PathBuf::from("<stdout>"), e)),
        Output::File(path) => {
            std::fs::write(&*path, text).map_err(|e| Error::Io(path.to_path_buf(), e))?;
            info!("Wrote shader '{}' to {:?}", document.name(), path);
            Ok(())
        }
    }
}

pub fn run(config: Config) -> Result<(), Error> {
    if config.shaders.is_empty() {
        return Err(Error::InvalidArgument(String::new(), "no input shader"));
    }
    let single_input = config.shaders.len() == 1;
    if let Some(output) = config.output {
        if !single_input && !Path::new(output).is_dir() {
            return Err(Error::InvalidArgument(output.to_string_lossy().into(), "several shaders need an output directory"));
        }
    }
    let n_threads = config.n_threads.max(1);
    let output = config.output;
    let operations = &config.operations;
    let shaders = config.shaders;
    let failures = crossbeam::scope(|scope| {
        let manager = ScopedThreadManager::new(scope);
        let mut pool: ThreadPool<ScopedThreadManager, Result<(), Error>> = ThreadPool::new(n_threads);
        info!("Initialized thread pool with {} max thread(s)", n_threads);
        for shader in shaders {
            let out = get_out_path(shader, output, single_input);
            pool.send(&manager, move |_| rewrite_single(shader, out, operations));
            debug!("Dispatch shader {:?}", shader);
        }
        pool.reduce()
            .filter_map(|v| v.unwrap_or_else(|_| Err(Error::WorkerPanic)).err())
            .inspect(|e| error!("{}", e))
            .count()
    }).map_err(|_| Error::WorkerPanic)?;
    if failures > 0 {
        return Err(Error::Failed(failures));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use bp3d_shaderlab::source::MemoryReader;
    use super::*;

    const SHADER: &str = "Shader \"T\"\n{\n    SubShader\n    {\n        Pass\n        {\n            name \"Forward\"\n            Cull [_Cull]\n            HLSLPROGRAM\n            #pragma shader_feature _A\n            #include \"lib.hlsl\"\n            #include \"Packages/ShaderPassForward.hlsl\"\n            ENDHLSL\n        }\n        Pass\n        {\n            name \"ShadowCaster\"\n            HLSLPROGRAM\n            ENDHLSL\n        }\n    }\n}\n";

    const REWRITTEN: &str = "{\n    SubShader\n    {\n        Tags { \"RenderPipeline\" = \"HD\" }\n        Pass\n        {\n            name \"Forward\"\n            Cull Back\n            HLSLPROGRAM\n            #define A 1\n            #define B\n            float lib;\n            float pre;\n            #include \"Packages/ShaderPassForward.hlsl\"\n            ENDHLSL\n        }\n    }\n}\n";

    #[test]
    fn pairs() {
        assert_eq!(parse_pair("_Cull=Back").unwrap(), ("_Cull", "Back"));
        assert_eq!(parse_pair("a.hlsl=b=c.hlsl").unwrap(), ("a.hlsl", "b=c.hlsl"));
        assert_eq!(parse_pair("Queue=").unwrap(), ("Queue", ""));
        assert!(matches!(parse_pair("=x"), Err(Error::InvalidArgument(_, _))));
        assert!(matches!(parse_pair("novalue"), Err(Error::InvalidArgument(_, _))));
    }

    #[test]
    fn defines() {
        assert_eq!(parse_define("A=1").unwrap(), "#define A 1");
        assert_eq!(parse_define("B").unwrap(), "#define B");
        assert!(parse_define("=1").is_err());
        assert!(parse_define("A B").is_err());
    }

    #[test]
    fn patterns() {
        let (regex, file) = parse_pattern("a=b\\s*=pre.hlsl").unwrap();
        assert_eq!(regex.as_str(), "a=b\\s*");
        assert_eq!(file, Path::new("pre.hlsl"));
        assert!(parse_pattern("(=pre.hlsl").is_err());
        assert!(parse_pattern("abc=").is_err());
    }

    #[test]
    fn apply_in_order() {
        let mut reader = MemoryReader::new();
        reader.insert("lib.hlsl", "float lib;\n");
        reader.insert("pre.hlsl", "    float pre;\n");
        let mut operations = Operations::new();
        operations.remove_passes.push("ShadowCaster".into());
        operations.strip.push("shader_feature".into());
        operations.defines.push(parse_define("A=1").unwrap());
        operations.defines.push(parse_define("B").unwrap());
        operations.insert_before.push(parse_pattern("#include\\s+\"Packages/ShaderPass=pre.hlsl").unwrap());
        operations.includes.push(("lib.hlsl".into(), "lib.hlsl".into()));
        operations.tags.push(("RenderPipeline".into(), "HD".into()));
        operations.variables.insert("_Cull".into(), "Back".into());
        operations.include_name = false;
        let mut document = Document::parse(SHADER).unwrap();
        operations.apply(&mut reader, &mut document).unwrap();
        assert_eq!(operations.render(&document), REWRITTEN);
    }

    #[test]
    fn missing_include_file() {
        let mut operations = Operations::new();
        operations.includes.push(("lib.hlsl".into(), "lib.hlsl".into()));
        let mut document = Document::parse(SHADER).unwrap();
        let err = operations.apply(&mut MemoryReader::new(), &mut document).unwrap_err();
        assert!(matches!(err, Error::Source(source::Error::NotFound(_))));
    }

    #[test]
    fn run_many() {
        let dir = std::env::temp_dir().join(format!("shaderw-test-{}", std::process::id()));
        let out = dir.join("out");
        std::fs::create_dir_all(&out).unwrap();
        let a = dir.join("a.shader");
        let b = dir.join("b.shader");
        std::fs::write(&a, SHADER).unwrap();
        std::fs::write(&b, "Shader \"B\" { Cull Off }").unwrap();
        let config = Config {
            n_threads: 2,
            output: Some(out.as_os_str()),
            shaders: vec![a.as_path(), b.as_path()],
            operations: Operations::new()
        };
        run(config).unwrap();
        assert_eq!(std::fs::read_to_string(out.join("b.shader")).unwrap(), "Shader \"B\"\n{\n    Cull Off\n}\n");
        let formatted = std::fs::read_to_string(out.join("a.shader")).unwrap();
        assert_eq!(Document::parse(&formatted).unwrap(), Document::parse(SHADER).unwrap());
        let config = Config {
            n_threads: 1,
            output: Some(a.as_os_str()),
            shaders: vec![a.as_path(), b.as_path()],
            operations: Operations::new()
        };
        assert!(matches!(run(config), Err(Error::InvalidArgument(_, _))));
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn run_counts_every_failure() {
        let dir = std::env::temp_dir().join(format!("shaderw-fail-{}", std::process::id()));
        let out = dir.join("out");
        std::fs::create_dir_all(&out).unwrap();
        let good = dir.join("good.shader");
        let bad = dir.join("bad.shader");
        let missing = dir.join("missing.shader");
        std::fs::write(&good, "Shader \"G\" { ZWrite Off }").unwrap();
        std::fs::write(&bad, "SubShader { }").unwrap();
        let config = Config {
            n_threads: 2,
            output: Some(out.as_os_str()),
            shaders: vec![bad.as_path(), good.as_path(), missing.as_path()],
            operations: Operations::new()
        };
        assert!(matches!(run(config), Err(Error::Failed(2))));
        assert_eq!(std::fs::read_to_string(out.join("good.shader")).unwrap(), "Shader \"G\"\n{\n    ZWrite Off\n}\n");
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
