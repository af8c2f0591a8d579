//! Program Definition Manifests
//!
//! This module provides parsing for JSON manifest files that describe a
//! shader program: which source module each stage comes from and which
//! pre-definitions the program wants injected. Stage names in manifests
//! use their lowercase GLSL spellings ("vertex", "fragment", ...).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer};

/// A programmable pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    TessControl,
    TessEvaluation,
    Geometry,
    Fragment,
    Compute,
}

impl ShaderStage {
    pub const ALL: &'static [ShaderStage] = &[
        ShaderStage::Vertex,
        ShaderStage::TessControl,
        ShaderStage::TessEvaluation,
        ShaderStage::Geometry,
        ShaderStage::Fragment,
        ShaderStage::Compute,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::TessControl => "tess_control",
            ShaderStage::TessEvaluation => "tess_evaluation",
            ShaderStage::Geometry => "geometry",
            ShaderStage::Fragment => "fragment",
            ShaderStage::Compute => "compute",
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error type for shader stage parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageParseError(String);

impl fmt::Display for StageParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown shader stage '{}'", self.0)
    }
}

impl std::error::Error for StageParseError {}

impl FromStr for ShaderStage {
    type Err = StageParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ShaderStage::ALL
            .iter()
            .copied()
            .find(|stage| stage.name() == s)
            .ok_or_else(|| StageParseError(s.to_string()))
    }
}

impl<'de> Deserialize<'de> for ShaderStage {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// One pre-definition a program asks for, with an optional fallback
/// value used when the shared registry has no entry for the name.
#[derive(Debug, Clone, Deserialize)]
pub struct DefinitionRequest {
    pub name: String,
    #[serde(default)]
    pub default: Option<String>,
}

/// A shader program manifest: per-stage module names plus requested
/// definitions.
#[derive(Debug, Clone, Deserialize)]
pub struct ProgramDefinition {
    pub name: String,
    #[serde(default)]
    pub vertex: Option<String>,
    #[serde(default)]
    pub tess_control: Option<String>,
    #[serde(default)]
    pub tess_evaluation: Option<String>,
    #[serde(default)]
    pub geometry: Option<String>,
    #[serde(default)]
    pub fragment: Option<String>,
    #[serde(default)]
    pub compute: Option<String>,
    #[serde(default)]
    pub definitions: Vec<DefinitionRequest>,
}

impl ProgramDefinition {
    /// Parses a program manifest from JSON content
    pub fn from_json(json_content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json_content)
    }

    /// The source module name for one stage, if declared.
    pub fn stage_source(&self, stage: ShaderStage) -> Option<&str> {
        let source = match stage {
            ShaderStage::Vertex => &self.vertex,
            ShaderStage::TessControl => &self.tess_control,
            ShaderStage::TessEvaluation => &self.tess_evaluation,
            ShaderStage::Geometry => &self.geometry,
            ShaderStage::Fragment => &self.fragment,
            ShaderStage::Compute => &self.compute,
        };
        source.as_deref()
    }

    /// All declared stages in pipeline order.
    pub fn stages(&self) -> impl Iterator<Item = (ShaderStage, &str)> {
        ShaderStage::ALL
            .iter()
            .filter_map(|stage| self.stage_source(*stage).map(|source| (*stage, source)))
    }
}
