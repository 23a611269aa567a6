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

use std::collections::{BTreeMap, HashMap};
use std::fmt::{Display, Formatter};
use std::ops::{Deref, DerefMut};

use log::debug;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

pub use crate::scanner::token::{RenderState, Sentinel, StencilOp};
use crate::scanner::token::{
    CHR_ARRAY_END,
    CHR_ARRAY_START,
    STR_NAME,
    STR_PASS,
    STR_SHADER,
    STR_STENCIL,
    STR_SUBSHADER,
    STR_TAGS
};
use crate::writer::Writer;

/// Insertion ordered string map holding the content of a `Tags { ... }` clause.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tags
{
    entries: Vec<(String, String)>
}

impl Tags
{
    pub fn new() -> Tags
    {
        Tags {
            entries: Vec::new()
        }
    }

    pub fn get(&self, key: &str) -> Option<&str>
    {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    /// Inserts or replaces a tag; a replaced tag keeps its original position.
    pub fn insert<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) -> Option<String>
    {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, old)) => Some(std::mem::replace(old, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<String>
    {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)>
    {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn values_mut(&mut self) -> impl Iterator<Item = &mut String>
    {
        self.entries.iter_mut().map(|(_, v)| v)
    }

    pub fn len(&self) -> usize
    {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool
    {
        self.entries.is_empty()
    }
}

impl Serialize for Tags
{
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error>
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Extracts `Name` out of a GUI bound reference of the form `[Name]`.
pub fn variable_reference(value: &str) -> Option<&str>
{
    let bytes = value.as_bytes();
    if bytes.len() > 2 && bytes[0] == CHR_ARRAY_START && bytes[bytes.len() - 1] == CHR_ARRAY_END {
        Some(&value[1..value.len() - 1])
    } else {
        None
    }
}

fn substitute(value: &mut String, variables: &HashMap<String, String>) -> bool
{
    let replacement = variable_reference(value).and_then(|name| variables.get(name));
    if let Some(replacement) = replacement {
        *value = replacement.clone();
        true
    } else {
        false
    }
}

/// State shared by every ShaderLab block: tags, render states, stencil state and
/// the embedded program.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Block
{
    pub(crate) tags: Tags,
    pub(crate) parameters: BTreeMap<RenderState, String>,
    pub(crate) stencil: BTreeMap<StencilOp, String>,
    pub(crate) program: Option<Vec<String>>
}

impl Block
{
    pub fn new() -> Block
    {
        Block::default()
    }

    pub fn tags(&self) -> &Tags
    {
        &self.tags
    }

    pub fn tags_mut(&mut self) -> &mut Tags
    {
        &mut self.tags
    }

    pub fn add_tag<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V)
    {
        self.tags.insert(key, value);
    }

    pub fn parameters(&self) -> &BTreeMap<RenderState, String>
    {
        &self.parameters
    }

    pub fn parameter(&self, state: RenderState) -> Option<&str>
    {
        self.parameters.get(&state).map(|v| v.as_str())
    }

    pub fn set_parameter<V: Into<String>>(&mut self, state: RenderState, value: V) -> Option<String>
    {
        self.parameters.insert(state, value.into())
    }

    pub fn stencil(&self) -> &BTreeMap<StencilOp, String>
    {
        &self.stencil
    }

    pub fn stencil_op(&self, op: StencilOp) -> Option<&str>
    {
        self.stencil.get(&op).map(|v| v.as_str())
    }

    pub fn set_stencil_op<V: Into<String>>(&mut self, op: StencilOp, value: V) -> Option<String>
    {
        self.stencil.insert(op, value.into())
    }

    /// Lines of the embedded program, None if the block has no program.
    pub fn program(&self) -> Option<&[String]>
    {
        self.program.as_deref()
    }

    pub fn program_mut(&mut self) -> Option<&mut Vec<String>>
    {
        self.program.as_mut()
    }

    pub fn set_program(&mut self, lines: Option<Vec<String>>)
    {
        self.program = lines;
    }

    /// Replaces every render state, stencil or tag value of the form `[Name]` with
    /// `variables[Name]`. Each value is looked up once: a replacement which is itself
    /// a `[Name]` reference is left as is until the next call.
    pub fn replace_parameter_variables(&mut self, variables: &HashMap<String, String>) -> usize
    {
        let mut count = 0;
        for value in self.parameters.values_mut().chain(self.stencil.values_mut()).chain(self.tags.values_mut()) {
            if substitute(value, variables) {
                count += 1;
            }
        }
        count
    }

    pub(crate) fn append_content_to(&self, writer: &mut Writer, sentinel: Sentinel)
    {
        if !self.tags.is_empty() {
            let tags: String = self.tags.iter().map(|(k, v)| format!("\"{}\" = \"{}\" ", k, v)).collect();
            writer.line(format!("{} {{ {}}}", STR_TAGS, tags));
        }
        for (state, value) in &self.parameters {
            writer.line(format!("{} {}", state.name(), value));
        }
        if !self.stencil.is_empty() {
            writer.open_block(STR_STENCIL);
            for (op, value) in &self.stencil {
                writer.line(format!("{} {}", op.name(), value));
            }
            writer.close_block();
        }
        if let Some(program) = &self.program {
            writer.line(sentinel.name());
            for line in program {
                writer.line(line);
            }
            writer.line(sentinel.end_name());
        }
    }
}

/// Common interface of the three block kinds of a ShaderLab document.
pub trait Part: Deref<Target = Block> + DerefMut
{
    /// Sentinel used when re-emitting the embedded program of this block.
    fn program_sentinel(&self) -> Sentinel;

    fn append_to(&self, writer: &mut Writer);

    fn to_text(&self) -> String
    {
        let mut writer = Writer::new();
        self.append_to(&mut writer);
        writer.into_inner()
    }
}

macro_rules! impl_block_deref {
    ($($t: ty),*) => {
        $(
            impl Deref for $t
            {
                type Target = Block;

                fn deref(&self) -> &Self::Target
                {
                    &self.block
                }
            }

            impl DerefMut for $t
            {
                fn deref_mut(&mut self) -> &mut Self::Target
                {
                    &mut self.block
                }
            }
        )*
    };
}

impl_block_deref!(Pass, SubShader, Document);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Pass
{
    #[serde(flatten)]
    pub(crate) block: Block,
    pub(crate) name: Option<String>
}

impl Pass
{
    pub fn new() -> Pass
    {
        Pass::default()
    }

    pub fn name(&self) -> Option<&str>
    {
        self.name.as_deref()
    }

    pub fn set_name<T: Into<String>>(&mut self, name: Option<T>)
    {
        self.name = name.map(|v| v.into());
    }
}

impl Part for Pass
{
    fn program_sentinel(&self) -> Sentinel
    {
        Sentinel::HlslProgram
    }

    fn append_to(&self, writer: &mut Writer)
    {
        writer.open_block(STR_PASS);
        if let Some(name) = &self.name {
            writer.line(format!("{} \"{}\"", STR_NAME, name));
        }
        self.block.append_content_to(writer, self.program_sentinel());
        writer.close_block();
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SubShader
{
    #[serde(flatten)]
    pub(crate) block: Block,
    pub(crate) passes: Vec<Pass>
}

impl SubShader
{
    pub fn new() -> SubShader
    {
        SubShader::default()
    }

    pub fn passes(&self) -> &[Pass]
    {
        &self.passes
    }

    pub fn passes_mut(&mut self) -> &mut Vec<Pass>
    {
        &mut self.passes
    }

    pub fn insert_shader_line_in_each_pass(&mut self, index: Option<usize>, line: &str)
    {
        for pass in &mut self.passes {
            pass.insert_shader_line(index, line);
        }
    }

    pub fn insert_shader_code_in_each_pass(&mut self, index: Option<usize>, code: &str)
    {
        for pass in &mut self.passes {
            pass.insert_shader_code(index, code);
        }
    }

    pub fn remove_shader_code_in_each_pass_containing(&mut self, pattern: &str) -> usize
    {
        self.passes.iter_mut().map(|pass| pass.remove_shader_code_containing(pattern)).sum()
    }

    /// Replaces the include in this block and in every pass; returns the number of blocks changed.
    pub fn replace_include(&mut self, file_path: &str, content: &str) -> usize
    {
        let mut count = self.block.replace_include(file_path, content) as usize;
        for pass in &mut self.passes {
            count += pass.replace_include(file_path, content) as usize;
        }
        count
    }

    /// Substitutes GUI variables in this block and in every pass.
    pub fn replace_parameter_variables(&mut self, variables: &HashMap<String, String>) -> usize
    {
        let mut count = self.block.replace_parameter_variables(variables);
        for pass in &mut self.passes {
            count += pass.replace_parameter_variables(variables);
        }
        count
    }

    pub fn remove_pass(&mut self, name: &str) -> usize
    {
        let len = self.passes.len();
        self.passes.retain(|pass| pass.name() != Some(name));
        len - self.passes.len()
    }
}

impl Part for SubShader
{
    fn program_sentinel(&self) -> Sentinel
    {
        Sentinel::HlslInclude
    }

    fn append_to(&self, writer: &mut Writer)
    {
        writer.open_block(STR_SUBSHADER);
        self.block.append_content_to(writer, self.program_sentinel());
        for pass in &self.passes {
            pass.append_to(writer);
        }
        writer.close_block();
    }
}

/// Root of a parsed ShaderLab document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Document
{
    #[serde(flatten)]
    pub(crate) block: Block,
    pub(crate) name: String,
    pub(crate) sub_shaders: Vec<SubShader>
}

impl Document
{
    pub fn new<T: Into<String>>(name: T) -> Document
    {
        Document {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Parses a complete ShaderLab document.
    pub fn parse(document: &str) -> Result<Document, crate::parser::error::Error>
    {
        crate::parser::Parser::new(document).parse()
    }

    pub fn name(&self) -> &str
    {
        &self.name
    }

    pub fn set_name<T: Into<String>>(&mut self, name: T)
    {
        self.name = name.into();
    }

    pub fn sub_shaders(&self) -> &[SubShader]
    {
        &self.sub_shaders
    }

    pub fn sub_shaders_mut(&mut self) -> &mut Vec<SubShader>
    {
        &mut self.sub_shaders
    }

    /// Every pass of every SubShader, in document order.
    pub fn passes(&self) -> impl Iterator<Item = &Pass>
    {
        self.sub_shaders.iter().flat_map(|v| v.passes.iter())
    }

    pub fn passes_mut(&mut self) -> impl Iterator<Item = &mut Pass>
    {
        self.sub_shaders.iter_mut().flat_map(|v| v.passes.iter_mut())
    }

    pub fn insert_shader_line_in_each_pass(&mut self, index: Option<usize>, line: &str)
    {
        for sub_shader in &mut self.sub_shaders {
            sub_shader.insert_shader_line_in_each_pass(index, line);
        }
    }

    pub fn insert_shader_code_in_each_pass(&mut self, index: Option<usize>, code: &str)
    {
        for sub_shader in &mut self.sub_shaders {
            sub_shader.insert_shader_code_in_each_pass(index, code);
        }
    }

    pub fn remove_shader_code_in_each_pass_containing(&mut self, pattern: &str) -> usize
    {
        self.sub_shaders
            .iter_mut()
            .map(|v| v.remove_shader_code_in_each_pass_containing(pattern))
            .sum()
    }

    /// Replaces the include in every block of the document; returns the number of blocks changed.
    pub fn replace_include(&mut self, file_path: &str, content: &str) -> usize
    {
        let mut count = self.block.replace_include(file_path, content) as usize;
        for sub_shader in &mut self.sub_shaders {
            count += sub_shader.replace_include(file_path, content);
        }
        debug!("Replaced include \"{}\" in {} block(s)", file_path, count);
        count
    }

    /// Substitutes GUI variables in every block of the document.
    pub fn replace_parameter_variables(&mut self, variables: &HashMap<String, String>) -> usize
    {
        let mut count = self.block.replace_parameter_variables(variables);
        for sub_shader in &mut self.sub_shaders {
            count += sub_shader.replace_parameter_variables(variables);
        }
        debug!("Substituted {} GUI variable reference(s)", count);
        count
    }

    /// Removes every pass named `name` from every SubShader.
    pub fn remove_pass(&mut self, name: &str) -> usize
    {
        let count: usize = self.sub_shaders.iter_mut().map(|v| v.remove_pass(name)).sum();
        debug!("Removed {} pass(es) named '{}'", count, name);
        count
    }

    pub fn append_to_with_name(&self, writer: &mut Writer, include_name: bool)
    {
        if include_name {
            writer.line(format!("{} \"{}\"", STR_SHADER, self.name));
        }
        writer.line("{");
        writer.indent();
        self.block.append_content_to(writer, self.program_sentinel());
        for sub_shader in &self.sub_shaders {
            sub_shader.append_to(writer);
        }
        writer.unindent();
        writer.line("}");
    }

    pub fn to_string_with_name(&self, include_name: bool) -> String
    {
        let mut writer = Writer::new();
        self.append_to_with_name(&mut writer, include_name);
        writer.into_inner()
    }
}

impl Part for Document
{
    fn program_sentinel(&self) -> Sentinel
    {
        Sentinel::HlslInclude
    }

    fn append_to(&self, writer: &mut Writer)
    {
        self.append_to_with_name(writer, true)
    }
}

impl Display for Document
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result
    {
        f.write_str(&self.to_text())
    }
}

#[cfg(test)]
mod tests
{
    use proptest::collection::vec;
    use proptest::prelude::*;

    use super::*;
    use crate::program::unindent;

    const LIT: &str = r##"Shader "Test/Lit"
{
    Properties
    {
        _Color("Color", Color) = (1,1,1,1)
    }
    HLSLINCLUDE
    #pragma target 4.5
    ENDHLSL
    SubShader
    {
        Tags { "RenderType" = "Opaque" "Queue" = "Geometry" }
        LOD 300
        Pass
        {
            Name "Forward"
            Tags { "LightMode" = "Forward" }
            Blend One Zero
            ZWrite [_ZWrite]
            Cull [_CullMode]
            Stencil
            {
                WriteMask [_StencilWriteMask]
                Ref [_StencilRef]
                Comp Always
                Pass Replace
            }
            HLSLPROGRAM
            #pragma vertex Vert
            #include "Packages/Lit/LitData.hlsl"
            float4 Frag() : SV_Target
            {
                return 1;
            }
            ENDHLSL
        }
    }
}
"##;

    const LIT_OUT: &str = r##"Shader "Test/Lit"
{
    HLSLINCLUDE
    #pragma target 4.5
    ENDHLSL
    SubShader
    {
        Tags { "RenderType" = "Opaque" "Queue" = "Geometry" }
        Pass
        {
            name "Forward"
            Tags { "LightMode" = "Forward" }
            Cull [_CullMode]
            ZWrite [_ZWrite]
            Stencil
            {
                WriteMask [_StencilWriteMask]
                Ref [_StencilRef]
                Comp Always
                Pass Replace
            }
            HLSLPROGRAM
            #pragma vertex Vert
            #include "Packages/Lit/LitData.hlsl"
            float4 Frag() : SV_Target
            {
                return 1;
            }
            ENDHLSL
        }
    }
}
"##;

    fn two_by_two() -> Document
    {
        let mut document = Document::new("Grid");
        for _ in 0..2 {
            let mut sub_shader = SubShader::new();
            for name in ["A", "B"] {
                let mut pass = Pass::new();
                pass.set_name(Some(name));
                pass.set_program(Some(vec!["float x;".into()]));
                sub_shader.passes_mut().push(pass);
            }
            document.sub_shaders_mut().push(sub_shader);
        }
        document
    }

    fn variables(pairs: &[(&str, &str)]) -> HashMap<String, String>
    {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn serialize_fixed_order()
    {
        let document = Document::parse(LIT).unwrap();
        assert_eq!(document.to_string(), LIT_OUT);
        assert_eq!(Document::parse(LIT_OUT).unwrap(), document);
    }

    #[test]
    fn serialize_without_name()
    {
        let mut document = Document::new("X");
        document.set_parameter(RenderState::Cull, "Off");
        assert_eq!(document.to_string_with_name(false), "{\n    Cull Off\n}\n");
        assert_eq!(document.to_string(), "Shader \"X\"\n{\n    Cull Off\n}\n");
    }

    #[test]
    fn tags_keep_declaration_order()
    {
        let document = Document::parse(
            "Shader \"T\" { SubShader { Tags { \"RenderType\" = \"Opaque\" \"Queue\" = \"Geometry\" } } }"
        )
        .unwrap();
        let text = document.to_string();
        assert!(text.contains("        Tags { \"RenderType\" = \"Opaque\" \"Queue\" = \"Geometry\" }\n"));
    }

    #[test]
    fn stencil_fixed_order()
    {
        let document = Document::parse("Shader \"T\" { Stencil { Pass Replace Comp Always Ref 2 } }").unwrap();
        assert_eq!(
            document.to_string(),
            "Shader \"T\"\n{\n    Stencil\n    {\n        Ref 2\n        Comp Always\n        Pass Replace\n    }\n}\n"
        );
    }

    #[test]
    fn tag_upsert()
    {
        let mut tags = Tags::new();
        tags.insert("A", "1");
        tags.insert("B", "2");
        assert_eq!(tags.insert("A", "3"), Some("1".into()));
        assert_eq!(tags.iter().collect::<Vec<_>>(), vec![("A", "3"), ("B", "2")]);
        assert_eq!(tags.remove("A"), Some("3".into()));
        assert_eq!(tags.remove("A"), None);
        assert_eq!(tags.len(), 1);
    }

    #[test]
    fn add_tag_on_pass()
    {
        let mut pass = Pass::new();
        pass.add_tag("LightMode", "Forward");
        pass.add_tag("LightMode", "DepthOnly");
        assert_eq!(pass.tags().get("LightMode"), Some("DepthOnly"));
        assert_eq!(pass.to_text(), "Pass\n{\n    Tags { \"LightMode\" = \"DepthOnly\" }\n}\n");
    }

    #[test]
    fn replace_include_everywhere()
    {
        let mut document = Document::parse(
            "Shader \"T\" {\n SubShader {\n  Pass {\n   HLSLPROGRAM\n   #include \"foo.hlsl\"\n   ENDHLSL\n  }\n  Pass {\n   HLSLPROGRAM\n   float a;\n   ENDHLSL\n  }\n }\n}"
        )
        .unwrap();
        assert_eq!(document.replace_include("foo.hlsl", "bar_body"), 1);
        let passes: Vec<_> = document.passes().collect();
        assert_eq!(passes[0].program().unwrap(), ["bar_body"]);
        assert_eq!(passes[1].program().unwrap(), ["float a;"]);
        assert_eq!(document.replace_include("foo.hlsl", "bar_body"), 0);
    }

    #[test]
    fn insert_line_in_every_pass()
    {
        let mut document = two_by_two();
        document.insert_shader_line_in_each_pass(Some(0), "#define X 1");
        assert_eq!(document.passes().count(), 4);
        for pass in document.passes() {
            assert_eq!(pass.program().unwrap(), ["#define X 1", "float x;"]);
        }
        for sub_shader in document.sub_shaders() {
            assert_eq!(sub_shader.program(), None);
        }
    }

    #[test]
    fn insert_code_and_remove()
    {
        let mut document = two_by_two();
        document.insert_shader_code_in_each_pass(None, "\n    #pragma multi_compile _ A\n    #pragma multi_compile _ B");
        for pass in document.passes() {
            assert_eq!(pass.program().unwrap(), ["float x;", "", "#pragma multi_compile _ A", "#pragma multi_compile _ B"]);
        }
        assert_eq!(document.remove_shader_code_in_each_pass_containing("multi_compile"), 8);
        assert_eq!(document.remove_shader_code_in_each_pass_containing("multi_compile"), 0);
    }

    #[test]
    fn remove_pass_by_name()
    {
        let mut document = two_by_two();
        assert_eq!(document.remove_pass("A"), 2);
        assert_eq!(document.remove_pass("Missing"), 0);
        assert!(document.passes().all(|v| v.name() == Some("B")));
        assert_eq!(document.sub_shaders().len(), 2);
    }

    #[test]
    fn parameter_variables()
    {
        let mut document = Document::parse(
            "Shader \"T\" { Cull [_CullMode] SubShader { Tags { \"Queue\" = \"[_Queue]\" } Pass { ZTest [_Missing] Stencil { Ref [_StencilRef] } } } }"
        )
        .unwrap();
        let vars = variables(&[("_CullMode", "Off"), ("_StencilRef", "2"), ("_Queue", "Transparent")]);
        assert_eq!(document.replace_parameter_variables(&vars), 3);
        assert_eq!(document.parameter(RenderState::Cull), Some("Off"));
        assert_eq!(document.sub_shaders()[0].tags().get("Queue"), Some("Transparent"));
        let pass = document.passes().next().unwrap();
        assert_eq!(pass.stencil_op(StencilOp::Ref), Some("2"));
        assert_eq!(pass.parameter(RenderState::ZTest), Some("[_Missing]"));
        let again = document.clone();
        assert_eq!(document.replace_parameter_variables(&vars), 0);
        assert_eq!(document, again);
    }

    #[test]
    fn parameter_variables_single_lookup()
    {
        // A replacement which is itself a reference is only resolved by the next call.
        let mut block = Block::new();
        block.set_parameter(RenderState::Cull, "[_A]");
        let vars = variables(&[("_A", "[_B]"), ("_B", "Back")]);
        assert_eq!(block.replace_parameter_variables(&vars), 1);
        assert_eq!(block.parameter(RenderState::Cull), Some("[_B]"));
        assert_eq!(block.replace_parameter_variables(&vars), 1);
        assert_eq!(block.parameter(RenderState::Cull), Some("Back"));
    }

    #[test]
    fn variable_references()
    {
        assert_eq!(variable_reference("[_Cull]"), Some("_Cull"));
        assert_eq!(variable_reference("[]"), None);
        assert_eq!(variable_reference("Off"), None);
        assert_eq!(variable_reference("[_A"), None);
    }

    #[test]
    fn programs_use_block_sentinels()
    {
        let document = Document::parse(
            "Shader \"T\" {\n CGINCLUDE\n float a;\n ENDCG\n SubShader {\n  Pass {\n   CGPROGRAM\n   float b;\n   ENDCG\n  }\n }\n}"
        )
        .unwrap();
        let text = document.to_string();
        assert!(text.contains("    HLSLINCLUDE\n    float a;\n    ENDHLSL\n"));
        assert!(text.contains("            HLSLPROGRAM\n            float b;\n            ENDHLSL\n"));
    }


    fn block_strategy() -> impl Strategy<Value = Block>
    {
        let value = "[A-Za-z0-9_]{1,8}|\\[_[A-Za-z]{1,6}\\]";
        let line = "( {0,4}x[a-z0-9;()=]{0,7})?";
        (
            vec(("[A-Za-z]{1,8}", "[A-Za-z0-9 ]{0,8}"), 0..3),
            vec((0..RenderState::ALL.len(), value), 0..4),
            vec((0..StencilOp::ALL.len(), value), 0..4),
            proptest::option::of(vec(line, 0..5))
        )
            .prop_map(|(tags, parameters, stencil, program)| {
                let mut block = Block::new();
                for (k, v) in tags {
                    block.add_tag(k, v);
                }
                for (i, v) in parameters {
                    block.set_parameter(RenderState::ALL[i], v);
                }
                for (i, v) in stencil {
                    block.set_stencil_op(StencilOp::ALL[i], v);
                }
                block.set_program(program.map(|lines| unindent(&lines.join("\n"))));
                block
            })
    }

    fn pass_strategy() -> impl Strategy<Value = Pass>
    {
        (block_strategy(), proptest::option::of("[A-Za-z ]{0,10}")).prop_map(|(block, name)| Pass { block, name })
    }

    fn sub_shader_strategy() -> impl Strategy<Value = SubShader>
    {
        (block_strategy(), vec(pass_strategy(), 0..3)).prop_map(|(block, passes)| SubShader { block, passes })
    }

    proptest! {
        #[test]
        fn text_round_trip(
            name in "[A-Za-z/ ]{0,12}",
            block in block_strategy(),
            sub_shaders in vec(sub_shader_strategy(), 0..3)
        )
        {
            let document = Document { block, name, sub_shaders };
            let text = document.to_string();
            let parsed = Document::parse(&text).unwrap();
            prop_assert_eq!(&parsed, &document);
            prop_assert_eq!(parsed.to_string(), text);
        }
    }
}
