// Copyright (c) 2022, BlockProject 3D
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

mod dump;
mod rewrite;

use std::path::Path;
use clap::{Arg, ArgMatches, Command};
use log::{error, info};
use cli_common::{alloc_verbosity_level, init_bp3d_logger};
use crate::rewrite::{parse_define, parse_pair, parse_pattern, Operations};

const PROG_NAME: &str = env!("CARGO_PKG_NAME");
const PROG_VERSION: &str = env!("CARGO_PKG_VERSION");

fn operations(args: &ArgMatches) -> Result<Operations, rewrite::Error> {
    let mut operations = Operations::new();
    operations.include_name = !args.is_present("no-name");
    for name in args.values_of("remove-pass").into_iter().flatten() {
        operations.remove_passes.push(name.into());
    }
    for text in args.values_of("strip").into_iter().flatten() {
        operations.strip.push(text.into());
    }
    for define in args.values_of("define").into_iter().flatten() {
        operations.defines.push(parse_define(define)?);
    }
    for arg in args.values_of("insert-before").into_iter().flatten() {
        operations.insert_before.push(parse_pattern(arg)?);
    }
    for arg in args.values_of("include").into_iter().flatten() {
        let (include, file) = parse_pair(arg)?;
        operations.includes.push((include.into(), file.into()));
    }
    for arg in args.values_of("tag").into_iter().flatten() {
        let (key, value) = parse_pair(arg)?;
        operations.tags.push((key.into(), value.into()));
    }
    for arg in args.values_of("var").into_iter().flatten() {
        let (name, value) = parse_pair(arg)?;
        operations.variables.insert(name.into(), value.into());
    }
    Ok(operations)
}

fn process(n_threads: usize, args: &ArgMatches, operations: Operations) -> i32 {
    let shaders = args.values_of_os("shader")
        .into_iter()
        .flatten()
        .map(Path::new)
        .collect();
    let cfg = rewrite::Config {
        n_threads,
        output: args.value_of_os("output"),
        shaders,
        operations
    };
    if let Err(e) = rewrite::run(cfg) {
        error!("{}", e);
        1
    } else {
        0
    }
}

fn dump_tree(args: &ArgMatches) -> i32 {
    let shader = match args.value_of_os("shader") {
        Some(v) => Path::new(v),
        None => return 1
    };
    if let Err(e) = dump::run(shader, !args.is_present("compact")) {
        error!("{}", e);
        1
    } else {
        0
    }
}

fn shader_args<'a>() -> [Arg<'a>; 2] {
    [
        Arg::new("output").short('o').long("output").takes_value(true)
            .allow_invalid_utf8(true).help("Output file, or directory when several shaders are given"),
        Arg::new("shader").required(true).multiple_values(true).allow_invalid_utf8(true)
            .help("List of ShaderLab file(s) to process")
    ]
}

fn run() -> i32 {
    let matches = Command::new(PROG_NAME)
        .author("BlockProject 3D")
        .about("BlockProject 3D SDK - ShaderLab Rewriter")
        .version(PROG_VERSION)
        .subcommand_required(true)
        .subcommands([
            Command::new("format").about("Parse and re-emit ShaderLab file(s) in normalized form")
                .args(shader_args()),
            Command::new("rewrite").about("Apply rewrite operations to ShaderLab file(s)")
                .args(shader_args())
                .args([
                    Arg::new("remove-pass").long("remove-pass").takes_value(true).multiple_occurrences(true)
                        .help("Remove every pass with the given name"),
                    Arg::new("strip").long("strip").takes_value(true).multiple_occurrences(true)
                        .help("Remove every program line containing the given text"),
                    Arg::new("define").short('D').long("define").takes_value(true).multiple_occurrences(true)
                        .help("Insert '#define NAME VALUE' at the top of every pass (NAME[=VALUE])"),
                    Arg::new("insert-before").long("insert-before").takes_value(true).multiple_occurrences(true)
                        .help("Insert the content of FILE before the first line matching PATTERN in every pass (PATTERN=FILE)"),
                    Arg::new("include").short('I').long("include").takes_value(true).multiple_occurrences(true)
                        .help("Replace '#include \"PATH\"' with the content of FILE (PATH=FILE)"),
                    Arg::new("tag").short('t').long("tag").takes_value(true).multiple_occurrences(true)
                        .help("Add a tag to every SubShader (KEY=VALUE)"),
                    Arg::new("var").long("var").takes_value(true).multiple_occurrences(true)
                        .help("Substitute the GUI variable reference [NAME] (NAME=VALUE)"),
                    Arg::new("no-name").long("no-name")
                        .help("Do not write the 'Shader \"name\"' header line")
                ]),
            Command::new("dump").about("Print the parsed tree of a ShaderLab file as JSON")
                .args([
                    Arg::new("compact").short('c').long("compact")
                        .help("Print the JSON on a single line"),
                    Arg::new("shader").required(true).allow_invalid_utf8(true)
                        .help("ShaderLab file to dump")
                ])
        ])
        .args([
            Arg::new("verbose").short('v').long("verbose").multiple_occurrences(true)
                .help("Enable verbose output"),
            Arg::new("threads").short('n').long("threads").takes_value(true)
                .help("Specify the maximum number of threads to use when processing shaders")
        ]).get_matches();
    alloc_verbosity_level(matches.occurrences_of("verbose"));
    info!("Initializing BlockProject 3D ShaderLab Rewriter...");
    let n_threads: usize = matches.value_of_t("threads").unwrap_or(1);
    if let Some(args) = matches.subcommand_matches("format") {
        return process(n_threads, args, Operations::new());
    }
    if let Some(args) = matches.subcommand_matches("rewrite") {
        return match operations(args) {
            Ok(operations) => process(n_threads, args, operations),
            Err(e) => {
                error!("{}", e);
                1
            }
        };
    }
    if let Some(args) = matches.subcommand_matches("dump") {
        return dump_tree(args);
    }
    0
}

fn main() {
    init_bp3d_logger(run);
}
