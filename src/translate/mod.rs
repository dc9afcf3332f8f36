//! Podspec -> XcodeGen spec translation
//!
//! Produces a project with a single static framework target named after the
//! pod. Dependencies are resolved through an injected `DependencyResolver`;
//! names it cannot resolve are dropped without error.

mod bundle_id;
mod search_paths;

use std::path::PathBuf;

use futures::future::join_all;
use indexmap::{IndexMap, IndexSet};
use serde_json::Value;
use xcodegen_spec::{
    ConfigurationMap, Dependency, InfoDescriptor, InfoProperties, PackageManifest, ProjectSpec,
    Settings, SpecOptions, Target, TargetSource, INFO_PLIST_FILENAME,
};

use crate::config::{merge_configs, merge_value};
use crate::resolver::DependencyResolver;

pub use bundle_id::pod_name_to_bundle_id;
pub use search_paths::{framework_search_paths, header_search_paths, COMMON_HEADER_PODS};

/// Podspec platform key -> XcodeGen platform name
const PLATFORM_NAMES: &[(&str, &str)] = &[
    ("ios", "iOS"),
    ("osx", "macOS"),
    ("macos", "macOS"),
    ("tvos", "tvOS"),
    ("watchos", "watchOS"),
];

/// Translation errors
#[derive(Debug, thiserror::Error)]
pub enum TranslateError {
    #[error("cannot derive a major version from `{0}`")]
    InvalidVersion(String),
}

/// Inputs that do not come from the podspec
#[derive(Debug, Clone)]
pub struct TranslateOptions {
    /// Absolute root of the CocoaPods public headers tree
    pub public_headers_dir: PathBuf,

    /// Written as `minimumXcodeGenVersion`
    pub minimum_generator_version: String,
}

impl Default for TranslateOptions {
    fn default() -> Self {
        Self {
            public_headers_dir: PathBuf::from("/ios/Pods/Headers/Public"),
            minimum_generator_version: "2.18.0".to_string(),
        }
    }
}

/// XcodeGen name for a podspec platform key.
///
/// Unknown keys pass through unchanged.
pub fn platform_name(key: &str) -> &str {
    match PLATFORM_NAMES.iter().find(|(k, _)| *k == key) {
        Some((_, name)) => name,
        None => {
            tracing::warn!(platform = key, "unmapped podspec platform");
            key
        }
    }
}

/// Numeric major component of a version string, e.g. "1.2.3" -> "1"
pub fn major_version(version: &str) -> Result<String, TranslateError> {
    if let Ok(parsed) = semver::Version::parse(version.trim()) {
        return Ok(parsed.major.to_string());
    }

    let leading = version.trim().split('.').next().unwrap_or_default();
    leading
        .parse::<u64>()
        .map(|major| major.to_string())
        .map_err(|_| TranslateError::InvalidVersion(version.to_string()))
}

/// Build the XcodeGen spec for a podspec
pub async fn create_spec_from_podspec(
    podspec: &PackageManifest,
    resolver: &dyn DependencyResolver,
    options: &TranslateOptions,
) -> Result<ProjectSpec, TranslateError> {
    let name = podspec.name.clone();

    let mut platforms: IndexSet<String> = IndexSet::new();
    let mut deployment_target: IndexMap<String, String> = IndexMap::new();
    for (key, version) in &podspec.platforms {
        let platform = platform_name(key).to_string();
        if let Some(version) = version {
            deployment_target.insert(platform.clone(), version.clone());
        }
        platforms.insert(platform);
    }

    let dependency_names: Vec<&str> = podspec.dependency_names().collect();
    let dependencies: Vec<Dependency> =
        join_all(dependency_names.iter().map(|dep| resolver.resolve(dep)))
            .await
            .into_iter()
            .flatten()
            .collect();
    if dependencies.len() < dependency_names.len() {
        tracing::debug!(
            pod = %name,
            "resolved {} of {} dependencies",
            dependencies.len(),
            dependency_names.len()
        );
    }

    let bundle_id = pod_name_to_bundle_id(&name);
    let frameworks: Vec<String> = podspec.frameworks.to_vec();

    let mut excludes = vec![
        INFO_PLIST_FILENAME.to_string(),
        format!("{}{}", name, xcodegen_spec::SPEC_FILE_SUFFIX),
        "*.xcodeproj".to_string(),
        "*.xcframework".to_string(),
        "*.podspec".to_string(),
    ];
    excludes.extend(podspec.exclude_files.to_vec());

    let source = TargetSource {
        path: String::new(),
        name: Some(name.clone()),
        create_intermediate_groups: Some(true),
        includes: podspec.source_files.to_vec(),
        excludes,
        compiler_flags: podspec.compiler_flags.clone(),
    };

    let target_dependencies: Vec<Dependency> = frameworks
        .iter()
        .map(|framework| Dependency::sdk(format!("{}.framework", framework)))
        .chain(dependencies.iter().cloned())
        .collect();

    let target_settings = merge_configs([
        &podspec.pod_target_xcconfig.clone().unwrap_or_default(),
        &config_map([("MACH_O_TYPE", "staticlib")]),
    ]);

    let identity = config_map([
        ("CFBundleIdentifier", bundle_id.as_str()),
        ("CFBundleName", name.as_str()),
        ("CFBundleShortVersionString", podspec.version.as_str()),
        ("CFBundleVersion", major_version(&podspec.version)?.as_str()),
    ]);
    let info_properties = merge_info_properties(&identity, podspec.info_plist.as_ref());

    let mut base = ConfigurationMap::new();
    base.insert("PRODUCT_BUNDLE_IDENTIFIER".to_string(), bundle_id.clone());
    if let Some(Some(ios)) = podspec.platforms.get("ios") {
        base.insert("IPHONEOS_DEPLOYMENT_TARGET".to_string(), ios.clone());
    }
    base.insert(
        "FRAMEWORK_SEARCH_PATHS".to_string(),
        framework_search_paths(&dependencies),
    );
    base.insert(
        "HEADER_SEARCH_PATHS".to_string(),
        header_search_paths(dependency_names.iter().copied(), &options.public_headers_dir),
    );
    // Keeps deprecated SDK frameworks (e.g. OpenGLES) from failing validation
    base.insert(
        "VALIDATE_WORKSPACE_SKIPPED_SDK_FRAMEWORKS".to_string(),
        frameworks.join(" "),
    );

    let target = Target {
        product_type: "framework".to_string(),
        platform: platforms.into_iter().collect(),
        sources: vec![source],
        dependencies: target_dependencies,
        settings: Some(Settings::base(target_settings)),
        info: Some(InfoDescriptor {
            path: INFO_PLIST_FILENAME.to_string(),
            properties: info_properties,
        }),
    };

    let mut targets = IndexMap::new();
    targets.insert(name.clone(), target);

    Ok(ProjectSpec {
        name,
        project_references: IndexMap::new(),
        targets,
        options: Some(SpecOptions {
            minimum_xcode_gen_version: Some(options.minimum_generator_version.clone()),
            deployment_target,
        }),
        settings: Some(Settings::base(base)),
    })
}

/// Layer the podspec's Info.plist entries over the identity properties.
///
/// String values follow the build-setting merge rule; any other plist value
/// replaces what was there.
fn merge_info_properties(
    identity: &ConfigurationMap,
    overrides: Option<&IndexMap<String, Value>>,
) -> InfoProperties {
    let mut merged: InfoProperties = identity
        .iter()
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect();

    for (key, value) in overrides.into_iter().flatten() {
        let next = match value {
            Value::String(next) => {
                let previous = merged.get(key).and_then(Value::as_str);
                Value::String(merge_value(previous, next))
            }
            other => other.clone(),
        };
        merged.insert(key.clone(), next);
    }
    merged
}

fn config_map<const N: usize>(pairs: [(&str, &str); N]) -> ConfigurationMap {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
