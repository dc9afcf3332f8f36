//! Xcode-backed prebuilder
//!
//! podspec -> XcodeGen spec -> .xcodeproj -> .xcframework, all inside the
//! package's `ios/` directory. The generated project and Info.plist are
//! removed once the framework is built, leaving only the `.xcframework`.
//!
//! `pod`, `xcodegen` and `xcodebuild` are blocking subprocesses and run on
//! tokio's blocking pool.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use xcodegen_spec::INFO_PLIST_FILENAME;

use crate::config::ToolConfig;
use crate::frameworks::{clean_frameworks, FrameworkBuilder};
use crate::generator::generate_xcode_project;
use crate::package::Package;
use crate::resolver::DependencyResolver;
use crate::scoped::ScopedPath;
use crate::tasks::{Prebuilder, TaskError};
use crate::translate::{create_spec_from_podspec, TranslateOptions};

pub struct XcodePrebuilder {
    config: ToolConfig,
    options: TranslateOptions,
    resolver: Arc<dyn DependencyResolver>,
}

impl XcodePrebuilder {
    /// Relative paths in `config` are resolved against `root`
    pub fn new(config: ToolConfig, root: &Path, resolver: Arc<dyn DependencyResolver>) -> Self {
        let options = translate_options(&config, root);
        Self {
            config,
            options,
            resolver,
        }
    }
}

/// Translation options derived from the tool configuration
pub fn translate_options(config: &ToolConfig, root: &Path) -> TranslateOptions {
    TranslateOptions {
        public_headers_dir: root.join(&config.headers.pods_public_dir),
        minimum_generator_version: config.generator.minimum_version.clone(),
    }
}

/// Run a blocking toolchain step on the blocking pool
async fn run_blocking<T, F>(step: F) -> Result<T, TaskError>
where
    F: FnOnce() -> Result<T, TaskError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(step).await?
}

#[async_trait]
impl Prebuilder for XcodePrebuilder {
    async fn prebuild(&self, pkg: &Package) -> Result<(), TaskError> {
        let manifest = {
            let pkg = pkg.clone();
            let pod = self.config.cocoapods.binary.clone();
            run_blocking(move || Ok(pkg.load_manifest(&pod)?)).await?
        };
        let spec =
            create_spec_from_podspec(&manifest, self.resolver.as_ref(), &self.options).await?;

        let ios_dir = pkg.ios_dir();
        let config = self.config.clone();
        let framework = run_blocking(move || {
            let _info_plist = ScopedPath::new(ios_dir.join(INFO_PLIST_FILENAME));
            let project =
                ScopedPath::new(generate_xcode_project(&ios_dir, &spec, &config.generator)?);

            let builder = FrameworkBuilder::new(config.xcodebuild);
            Ok(builder.build_xcframework(project.path(), &spec.name, &ios_dir)?)
        })
        .await?;

        tracing::info!(
            package = %pkg.package_name,
            "built {}",
            framework.display()
        );
        Ok(())
    }

    async fn clean(&self, packages: &[&Package]) -> Result<(), TaskError> {
        let owned: Vec<Package> = packages.iter().map(|pkg| (*pkg).clone()).collect();
        let removed = run_blocking(move || {
            let packages: Vec<&Package> = owned.iter().collect();
            Ok(clean_frameworks(&packages)?)
        })
        .await?;
        tracing::info!("removed {} prebuilt artifact(s)", removed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_translate_options_resolve_against_root() {
        let config = ToolConfig::default();
        let options = translate_options(&config, Path::new("/repo"));

        assert_eq!(
            options.public_headers_dir,
            PathBuf::from("/repo/ios/Pods/Headers/Public")
        );
        assert_eq!(options.minimum_generator_version, "2.18.0");
    }

    #[test]
    fn test_absolute_headers_dir_kept() {
        let mut config = ToolConfig::default();
        config.headers.pods_public_dir = PathBuf::from("/abs/Headers/Public");

        let options = translate_options(&config, Path::new("/repo"));
        assert_eq!(options.public_headers_dir, PathBuf::from("/abs/Headers/Public"));
    }
}
