//! Target dependency descriptors
//!
//! XcodeGen writes a dependency as a single-key map naming its kind
//! (`framework`, `target`, `sdk` or `package`) plus optional linkage flags.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// What a dependency refers to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyKind {
    /// Path to a prebuilt framework or xcframework
    Framework(String),
    /// Another target in the same project
    Target(String),
    /// System framework (e.g., "CoreLocation.framework")
    Sdk(String),
    /// Swift package product
    Package(String),
}

/// Linkage flags shared by every dependency kind
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyFlags {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embed: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_sign: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remove_headers: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weak: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    #[serde(flatten)]
    pub kind: DependencyKind,

    #[serde(flatten)]
    pub flags: DependencyFlags,
}

impl Dependency {
    pub fn new(kind: DependencyKind) -> Self {
        Self {
            kind,
            flags: DependencyFlags::default(),
        }
    }

    pub fn framework(path: impl Into<String>) -> Self {
        Self::new(DependencyKind::Framework(path.into()))
    }

    pub fn target(name: impl Into<String>) -> Self {
        Self::new(DependencyKind::Target(name.into()))
    }

    pub fn sdk(name: impl Into<String>) -> Self {
        Self::new(DependencyKind::Sdk(name.into()))
    }

    pub fn link(mut self, link: bool) -> Self {
        self.flags.link = Some(link);
        self
    }

    /// Framework path, if this is a framework reference
    pub fn framework_path(&self) -> Option<&str> {
        match &self.kind {
            DependencyKind::Framework(path) => Some(path),
            _ => None,
        }
    }

    /// Directory that contains the referenced framework
    pub fn framework_dir(&self) -> Option<&Path> {
        self.framework_path().map(|path| {
            Path::new(path)
                .parent()
                .unwrap_or_else(|| Path::new(""))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sdk_serializes_as_single_key() {
        let dep = Dependency::sdk("CoreLocation.framework");
        assert_eq!(
            serde_json::to_value(&dep).unwrap(),
            json!({"sdk": "CoreLocation.framework"})
        );
    }

    #[test]
    fn test_flags_serialize_camel_case() {
        let mut dep = Dependency::framework("Pods/React/React.xcframework").link(false);
        dep.flags.code_sign = Some(false);
        dep.flags.remove_headers = Some(true);

        assert_eq!(
            serde_json::to_value(&dep).unwrap(),
            json!({
                "framework": "Pods/React/React.xcframework",
                "link": false,
                "codeSign": false,
                "removeHeaders": true
            })
        );
    }

    #[test]
    fn test_deserialize_with_flags() {
        let dep: Dependency =
            serde_json::from_value(json!({"target": "Core", "embed": true, "weak": false}))
                .unwrap();

        assert_eq!(dep.kind, DependencyKind::Target("Core".to_string()));
        assert_eq!(dep.flags.embed, Some(true));
        assert_eq!(dep.flags.weak, Some(false));
        assert_eq!(dep.flags.link, None);
    }

    #[test]
    fn test_framework_dir() {
        let dep = Dependency::framework("/abs/ios/UMCore.xcframework");
        assert_eq!(dep.framework_dir(), Some(Path::new("/abs/ios")));
        assert_eq!(Dependency::sdk("UIKit.framework").framework_dir(), None);
    }
}
