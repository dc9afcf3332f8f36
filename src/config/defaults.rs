//! Built-in defaults (layer 1) and the typed tool configuration

use std::path::PathBuf;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use xcodegen_spec::Dependency;

/// Fully merged tool configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    /// Directory whose children are the publishable packages
    pub packages_dir: PathBuf,

    pub generator: GeneratorConfig,

    pub xcodebuild: XcodebuildConfig,

    pub cocoapods: CocoapodsConfig,

    pub headers: HeadersConfig,

    pub prebuild: PrebuildConfig,

    /// Fixed dependency name -> descriptor table consulted before packages
    pub dependencies: IndexMap<String, Dependency>,
}

/// Project generator (XcodeGen) settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Generator executable (default: "xcodegen")
    pub binary: String,

    /// Working directory for the generator; the output directory when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<PathBuf>,

    /// Written to the spec as `minimumXcodeGenVersion` (default: "2.18.0")
    pub minimum_version: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            binary: "xcodegen".to_string(),
            working_dir: None,
            minimum_version: "2.18.0".to_string(),
        }
    }
}

/// xcodebuild settings for framework archives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct XcodebuildConfig {
    /// xcodebuild executable (default: "xcodebuild")
    pub binary: String,

    /// Build configuration (default: "Release")
    pub configuration: String,

    /// One archive is produced per destination
    pub destinations: Vec<String>,
}

impl Default for XcodebuildConfig {
    fn default() -> Self {
        Self {
            binary: "xcodebuild".to_string(),
            configuration: "Release".to_string(),
            destinations: vec![
                "generic/platform=iOS".to_string(),
                "generic/platform=iOS Simulator".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CocoapodsConfig {
    /// `pod` executable, used to evaluate Ruby podspecs
    pub binary: String,
}

impl Default for CocoapodsConfig {
    fn default() -> Self {
        Self {
            binary: "pod".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadersConfig {
    /// Root of the CocoaPods public headers tree
    pub pods_public_dir: PathBuf,
}

impl Default for HeadersConfig {
    fn default() -> Self {
        Self {
            pods_public_dir: PathBuf::from("ios/Pods/Headers/Public"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrebuildConfig {
    /// Package names allowed to be prebuilt
    pub packages: Vec<String>,
}

impl ToolConfig {
    /// Built-in defaults as a JSON value for layering
    pub fn builtin_value() -> serde_json::Value {
        let mut defaults = Self::default();
        defaults.packages_dir = PathBuf::from("packages");
        serde_json::to_value(defaults).unwrap_or(serde_json::Value::Null)
    }
}
