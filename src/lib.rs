//! pod-prebuild - podspec to xcframework prebuilds
//!
//! Translates CocoaPods podspecs into XcodeGen project specs, generates
//! Xcode projects from them, and prebuilds or cleans xcframeworks for the
//! packages being published.

pub mod config;
pub mod frameworks;
pub mod generator;
pub mod package;
pub mod prebuilder;
pub mod resolver;
pub mod scoped;
pub mod tasks;
pub mod translate;

pub use config::{EffectiveConfig, ToolConfig};
pub use generator::generate_xcode_project;
pub use package::{discover_packages, Package, Parcel, PrebuildPolicy};
pub use prebuilder::XcodePrebuilder;
pub use resolver::{
    ChainResolver, DependencyResolver, FnResolver, PrebuiltResolver, StaticResolver,
};
pub use tasks::{CleanPrebuildsTask, PrebuildPackagesTask, Task, TaskRunner};
pub use translate::{create_spec_from_podspec, TranslateOptions};
pub use xcodegen_spec::{Dependency, PackageManifest, ProjectSpec};
