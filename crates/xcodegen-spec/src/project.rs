//! XcodeGen project spec model
//!
//! Field names follow XcodeGen's camelCase spec format so the structure can
//! be written straight to a `.spec.json` file.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::dependency::Dependency;
use crate::podspec::OneOrMany;

/// Ordered build-setting map
pub type ConfigurationMap = IndexMap<String, String>;

/// Ordered Info.plist map; values keep their plist type (string, bool, array, ...)
pub type InfoProperties = IndexMap<String, serde_json::Value>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSpec {
    pub name: String,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub project_references: IndexMap<String, ProjectReference>,

    pub targets: IndexMap<String, Target>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<SpecOptions>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<Settings>,
}

impl ProjectSpec {
    /// File name of the temporary spec handed to the generator
    pub fn spec_file_name(&self) -> String {
        format!("{}{}", self.name, crate::SPEC_FILE_SUFFIX)
    }

    /// File name of the project bundle the generator writes
    pub fn project_file_name(&self) -> String {
        format!("{}.{}", self.name, crate::PROJECT_EXTENSION)
    }

    /// Pretty JSON form
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectReference {
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Target {
    /// Product type (e.g., "framework")
    #[serde(rename = "type")]
    pub product_type: String,

    /// XcodeGen platform names (e.g., "iOS")
    pub platform: Vec<String>,

    pub sources: Vec<TargetSource>,

    #[serde(default)]
    pub dependencies: Vec<Dependency>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<Settings>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<InfoDescriptor>,
}

/// One source rule of a target
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetSource {
    pub path: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_intermediate_groups: Option<bool>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub includes: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub excludes: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compiler_flags: Option<OneOrMany>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub base: ConfigurationMap,
}

impl Settings {
    pub fn base(base: ConfigurationMap) -> Self {
        Self { base }
    }
}

/// Info.plist generated by XcodeGen
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfoDescriptor {
    pub path: String,
    pub properties: InfoProperties,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_xcode_gen_version: Option<String>,

    /// XcodeGen platform name -> deployment target
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub deployment_target: IndexMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> ProjectSpec {
        let mut targets = IndexMap::new();
        targets.insert(
            "EXFoo".to_string(),
            Target {
                product_type: "framework".to_string(),
                platform: vec!["iOS".to_string()],
                sources: vec![TargetSource {
                    path: String::new(),
                    name: Some("EXFoo".to_string()),
                    create_intermediate_groups: Some(true),
                    includes: vec!["**/*.m".to_string()],
                    ..Default::default()
                }],
                dependencies: vec![Dependency::sdk("UIKit.framework")],
                settings: None,
                info: None,
            },
        );

        let mut deployment_target = IndexMap::new();
        deployment_target.insert("iOS".to_string(), "12.0".to_string());

        ProjectSpec {
            name: "EXFoo".to_string(),
            project_references: IndexMap::new(),
            targets,
            options: Some(SpecOptions {
                minimum_xcode_gen_version: Some("2.18.0".to_string()),
                deployment_target,
            }),
            settings: None,
        }
    }

    #[test]
    fn test_serializes_xcodegen_keys() {
        let value = serde_json::to_value(sample()).unwrap();

        assert_eq!(value["options"]["minimumXcodeGenVersion"], "2.18.0");
        assert_eq!(value["options"]["deploymentTarget"]["iOS"], "12.0");
        assert_eq!(value["targets"]["EXFoo"]["type"], "framework");
        assert_eq!(
            value["targets"]["EXFoo"]["sources"][0]["createIntermediateGroups"],
            true
        );
        assert_eq!(
            value["targets"]["EXFoo"]["dependencies"],
            json!([{"sdk": "UIKit.framework"}])
        );
        assert!(value.get("projectReferences").is_none());
        assert!(value.get("settings").is_none());
    }

    #[test]
    fn test_info_properties_keep_plist_types() {
        let mut spec = sample();
        let target = spec.targets.get_mut("EXFoo").unwrap();
        target.info = Some(InfoDescriptor {
            path: "Info-generated.plist".to_string(),
            properties: InfoProperties::from([
                ("CFBundleName".to_string(), json!("EXFoo")),
                ("UIFileSharingEnabled".to_string(), json!(true)),
                ("UIBackgroundModes".to_string(), json!(["location"])),
            ]),
        });

        let value = serde_json::to_value(&spec).unwrap();
        let properties = &value["targets"]["EXFoo"]["info"]["properties"];
        assert_eq!(properties["CFBundleName"], "EXFoo");
        assert_eq!(properties["UIFileSharingEnabled"], true);
        assert_eq!(properties["UIBackgroundModes"], json!(["location"]));
    }

    #[test]
    fn test_file_names() {
        let spec = sample();
        assert_eq!(spec.spec_file_name(), "EXFoo.spec.json");
        assert_eq!(spec.project_file_name(), "EXFoo.xcodeproj");
    }

    #[test]
    fn test_json_reparses() {
        let spec = sample();
        let parsed: ProjectSpec = serde_json::from_str(&spec.to_json().unwrap()).unwrap();
        assert_eq!(parsed, spec);
    }
}
