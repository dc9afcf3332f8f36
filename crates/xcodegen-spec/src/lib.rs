//! Podspec and XcodeGen types
//!
//! Serde models for the two documents the prebuild tooling moves between:
//! the JSON form of a CocoaPods podspec and the project spec consumed by
//! XcodeGen.

pub mod dependency;
pub mod podspec;
pub mod project;

pub use dependency::{Dependency, DependencyFlags, DependencyKind};
pub use podspec::{ManifestError, OneOrMany, PackageManifest};
pub use project::{
    ConfigurationMap, InfoDescriptor, InfoProperties, ProjectReference, ProjectSpec, Settings, SpecOptions,
    Target, TargetSource,
};

/// Build-setting token meaning "combine with the lower-precedence value".
pub const INHERITED: &str = "$(inherited)";

/// File name of the generated Info.plist inside a package's ios directory.
pub const INFO_PLIST_FILENAME: &str = "Info-generated.plist";

/// Extension of the project bundle produced by XcodeGen.
pub const PROJECT_EXTENSION: &str = "xcodeproj";

/// Extension of the temporary spec file handed to XcodeGen.
pub const SPEC_FILE_SUFFIX: &str = ".spec.json";
