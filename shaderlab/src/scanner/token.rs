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

use phf::phf_map;
use serde::Serialize;

pub const STR_SHADER: &str = "Shader";
pub const STR_SUBSHADER: &str = "SubShader";
pub const STR_PASS: &str = "Pass";
pub const STR_NAME: &str = "name";
pub const STR_TAGS: &str = "Tags";
pub const STR_STENCIL: &str = "Stencil";
pub const STR_LINE_COMMENT: &str = "//";
pub const STR_BLOCK_COMMENT_START: &str = "/*";
pub const STR_BLOCK_COMMENT_END: &str = "*/";
pub const STR_INCLUDE: &str = "#include";

pub const CHR_BLOCK_START: u8 = b'{';
pub const CHR_BLOCK_END: u8 = b'}';
pub const CHR_QUOTE: u8 = b'"';
pub const CHR_ESCAPE: u8 = b'\\';
pub const CHR_ARRAY_START: u8 = b'[';
pub const CHR_ARRAY_END: u8 = b']';
pub const CHR_EQ: u8 = b'=';
pub const CHR_NL: u8 = b'\n';

/// Keyword opening an embedded program block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Sentinel
{
    HlslProgram,
    HlslInclude,
    CgProgram,
    CgInclude
}

impl Sentinel
{
    pub fn name(&self) -> &'static str
    {
        match self {
            Sentinel::HlslProgram => "HLSLPROGRAM",
            Sentinel::HlslInclude => "HLSLINCLUDE",
            Sentinel::CgProgram => "CGPROGRAM",
            Sentinel::CgInclude => "CGINCLUDE"
        }
    }

    /// The keyword which must appear alone on a line to close this program block.
    pub fn end_name(&self) -> &'static str
    {
        match self {
            Sentinel::HlslProgram | Sentinel::HlslInclude => "ENDHLSL",
            Sentinel::CgProgram | Sentinel::CgInclude => "ENDCG"
        }
    }
}

impl Display for Sentinel
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result
    {
        f.write_str(self.name())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Keyword
{
    Shader,
    SubShader,
    Pass,
    Name,
    Tags,
    Stencil,
    Properties,
    Program(Sentinel)
}

/// Render state commands persisted by a block, in emission order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum RenderState
{
    Cull,
    ZTest,
    ZWrite,
    ZClip,
    ColorMask
}

impl RenderState
{
    pub const ALL: [RenderState; 5] = [
        RenderState::Cull,
        RenderState::ZTest,
        RenderState::ZWrite,
        RenderState::ZClip,
        RenderState::ColorMask
    ];

    pub fn name(&self) -> &'static str
    {
        match self {
            RenderState::Cull => "Cull",
            RenderState::ZTest => "ZTest",
            RenderState::ZWrite => "ZWrite",
            RenderState::ZClip => "ZClip",
            RenderState::ColorMask => "ColorMask"
        }
    }
}

/// Fields of a `Stencil { ... }` block, in emission order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum StencilOp
{
    ReadMask,
    WriteMask,
    Ref,
    Comp,
    Pass,
    Fail,
    ZFail
}

impl StencilOp
{
    pub const ALL: [StencilOp; 7] = [
        StencilOp::ReadMask,
        StencilOp::WriteMask,
        StencilOp::Ref,
        StencilOp::Comp,
        StencilOp::Pass,
        StencilOp::Fail,
        StencilOp::ZFail
    ];

    pub fn name(&self) -> &'static str
    {
        match self {
            StencilOp::ReadMask => "ReadMask",
            StencilOp::WriteMask => "WriteMask",
            StencilOp::Ref => "Ref",
            StencilOp::Comp => "Comp",
            StencilOp::Pass => "Pass",
            StencilOp::Fail => "Fail",
            StencilOp::ZFail => "ZFail"
        }
    }
}

// All tables are keyed by the lowercase spelling: ShaderLab keywords are case insensitive.
static KEYWORDS: phf::Map<&'static str, Keyword> = phf_map! {
    "shader" => Keyword::Shader,
    "subshader" => Keyword::SubShader,
    "pass" => Keyword::Pass,
    "name" => Keyword::Name,
    "tags" => Keyword::Tags,
    "stencil" => Keyword::Stencil,
    "properties" => Keyword::Properties,
    "hlslprogram" => Keyword::Program(Sentinel::HlslProgram),
    "hlslinclude" => Keyword::Program(Sentinel::HlslInclude),
    "cgprogram" => Keyword::Program(Sentinel::CgProgram),
    "cginclude" => Keyword::Program(Sentinel::CgInclude)
};

static RENDER_STATES: phf::Map<&'static str, RenderState> = phf_map! {
    "cull" => RenderState::Cull,
    "ztest" => RenderState::ZTest,
    "zwrite" => RenderState::ZWrite,
    "zclip" => RenderState::ZClip,
    "colormask" => RenderState::ColorMask
};

static STENCIL_OPS: phf::Map<&'static str, StencilOp> = phf_map! {
    "readmask" => StencilOp::ReadMask,
    "writemask" => StencilOp::WriteMask,
    "ref" => StencilOp::Ref,
    "comp" => StencilOp::Comp,
    "pass" => StencilOp::Pass,
    "fail" => StencilOp::Fail,
    "zfail" => StencilOp::ZFail
};

pub fn check_keyword(name: &str) -> Option<Keyword>
{
    KEYWORDS.get(name.to_ascii_lowercase().as_str()).copied()
}

pub fn check_sentinel(name: &str) -> Option<Sentinel>
{
    match check_keyword(name) {
        Some(Keyword::Program(sentinel)) => Some(sentinel),
        _ => None
    }
}

pub fn check_render_state(name: &str) -> Option<RenderState>
{
    RENDER_STATES.get(name.to_ascii_lowercase().as_str()).copied()
}

pub fn check_stencil_op(name: &str) -> Option<StencilOp>
{
    STENCIL_OPS.get(name.to_ascii_lowercase().as_str()).copied()
}
