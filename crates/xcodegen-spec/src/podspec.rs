//! Podspec (package manifest) model
//!
//! Mirrors the JSON printed by `pod ipc spec`. Only the fields the
//! translator consumes are modeled; anything else in the document is ignored.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// A podspec attribute that may be written as a single string or a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl Default for OneOrMany {
    fn default() -> Self {
        OneOrMany::Many(Vec::new())
    }
}

impl OneOrMany {
    /// Iterate the values in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        let slice: &[String] = match self {
            OneOrMany::One(value) => std::slice::from_ref(value),
            OneOrMany::Many(values) => values.as_slice(),
        };
        slice.iter().map(String::as_str)
    }

    /// Owned copy of the values
    pub fn to_vec(&self) -> Vec<String> {
        self.iter().map(str::to_string).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

impl From<&str> for OneOrMany {
    fn from(value: &str) -> Self {
        OneOrMany::One(value.to_string())
    }
}

impl From<Vec<String>> for OneOrMany {
    fn from(values: Vec<String>) -> Self {
        OneOrMany::Many(values)
    }
}

/// Declarative description of a native package (the podspec).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PackageManifest {
    /// Pod name, also used as the target and product name
    pub name: String,

    /// Marketing version (e.g., "1.2.3")
    pub version: String,

    /// Platform key (e.g., "ios") -> minimum deployment version.
    /// `None` when the podspec names the platform without a version.
    #[serde(default)]
    pub platforms: IndexMap<String, Option<String>>,

    /// Dependency pod name -> version constraints
    #[serde(default)]
    pub dependencies: IndexMap<String, OneOrMany>,

    #[serde(default)]
    pub source_files: OneOrMany,

    #[serde(default)]
    pub exclude_files: OneOrMany,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compiler_flags: Option<OneOrMany>,

    /// System frameworks the pod links against, without extension
    #[serde(default)]
    pub frameworks: OneOrMany,

    /// Build settings applied to the pod's own target
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pod_target_xcconfig: Option<IndexMap<String, String>>,

    /// Info.plist entries layered over the generated identity properties
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info_plist: Option<IndexMap<String, serde_json::Value>>,
}

impl PackageManifest {
    /// Parse a manifest from its JSON form
    pub fn from_json_str(json: &str) -> Result<Self, ManifestError> {
        let manifest: PackageManifest = serde_json::from_str(json)?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Load a `.podspec.json` file
    pub fn from_file(path: &Path) -> Result<Self, ManifestError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Names of declared dependencies, in declaration order
    pub fn dependency_names(&self) -> impl Iterator<Item = &str> {
        self.dependencies.keys().map(String::as_str)
    }

    fn validate(&self) -> Result<(), ManifestError> {
        if self.name.trim().is_empty() {
            return Err(ManifestError::MissingField("name"));
        }
        if self.version.trim().is_empty() {
            return Err(ManifestError::MissingField("version"));
        }
        Ok(())
    }
}

/// Errors loading a manifest
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid podspec JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("podspec is missing required field `{0}`")]
    MissingField(&'static str),
}
