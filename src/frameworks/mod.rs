//! xcframework builds and cleanup
//!
//! One `xcodebuild archive` per destination, then `-create-xcframework`
//! over the archived frameworks. Intermediate archives are removed on every
//! exit path.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

use walkdir::WalkDir;
use xcodegen_spec::{INFO_PLIST_FILENAME, PROJECT_EXTENSION, SPEC_FILE_SUFFIX};

use crate::config::XcodebuildConfig;
use crate::package::Package;
use crate::scoped::ScopedPath;

/// Errors for framework builds
#[derive(Debug, thiserror::Error)]
pub enum FrameworkError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("failed to run `{binary}`: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: io::Error,
    },

    #[error("{description} exited with {status}")]
    Failed {
        description: String,
        status: ExitStatus,
    },
}

/// Builds xcframeworks out of generated projects
#[derive(Debug, Clone)]
pub struct FrameworkBuilder {
    config: XcodebuildConfig,
}

impl FrameworkBuilder {
    pub fn new(config: XcodebuildConfig) -> Self {
        Self { config }
    }

    /// Archive `scheme` for every destination and assemble
    /// `<out_dir>/<scheme>.xcframework`.
    pub fn build_xcframework(
        &self,
        project: &Path,
        scheme: &str,
        out_dir: &Path,
    ) -> Result<PathBuf, FrameworkError> {
        let archives = ScopedPath::new(out_dir.join(format!(".{}-archives", scheme)));
        fs::create_dir_all(archives.path())?;

        let mut frameworks = Vec::with_capacity(self.config.destinations.len());
        for destination in &self.config.destinations {
            let archive_path = archives
                .path()
                .join(format!("{}.xcarchive", archive_slug(destination)));

            tracing::info!(scheme, destination = %destination, "archiving");
            let mut cmd = Command::new(&self.config.binary);
            cmd.args(self.archive_args(project, scheme, destination, &archive_path));
            self.run(cmd, &format!("archive for {}", destination))?;

            frameworks.push(
                archive_path
                    .join("Products/Library/Frameworks")
                    .join(format!("{}.framework", scheme)),
            );
        }

        let output = out_dir.join(format!("{}.xcframework", scheme));
        if output.exists() {
            fs::remove_dir_all(&output)?;
        }

        let mut cmd = Command::new(&self.config.binary);
        cmd.args(create_xcframework_args(&frameworks, &output));
        self.run(cmd, "create-xcframework")?;

        Ok(output)
    }

    /// Arguments for one `xcodebuild archive` invocation
    pub fn archive_args(
        &self,
        project: &Path,
        scheme: &str,
        destination: &str,
        archive_path: &Path,
    ) -> Vec<String> {
        vec![
            "archive".to_string(),
            "-project".to_string(),
            project.display().to_string(),
            "-scheme".to_string(),
            scheme.to_string(),
            "-configuration".to_string(),
            self.config.configuration.clone(),
            "-destination".to_string(),
            destination.to_string(),
            "-archivePath".to_string(),
            archive_path.display().to_string(),
            "SKIP_INSTALL=NO".to_string(),
            "BUILD_LIBRARY_FOR_DISTRIBUTION=YES".to_string(),
        ]
    }

    fn run(&self, mut cmd: Command, description: &str) -> Result<(), FrameworkError> {
        let status = cmd.status().map_err(|source| FrameworkError::Spawn {
            binary: self.config.binary.clone(),
            source,
        })?;
        if !status.success() {
            return Err(FrameworkError::Failed {
                description: format!("{} {}", self.config.binary, description),
                status,
            });
        }
        Ok(())
    }
}

/// Arguments for `xcodebuild -create-xcframework`
pub fn create_xcframework_args(frameworks: &[PathBuf], output: &Path) -> Vec<String> {
    let mut args = vec!["-create-xcframework".to_string()];
    for framework in frameworks {
        args.push("-framework".to_string());
        args.push(framework.display().to_string());
    }
    args.push("-output".to_string());
    args.push(output.display().to_string());
    args
}

/// "generic/platform=iOS Simulator" -> "generic-platform-ios-simulator"
fn archive_slug(destination: &str) -> String {
    destination
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

fn is_generated_artifact(name: &str) -> bool {
    name.ends_with(".xcframework")
        || name.ends_with(&format!(".{}", PROJECT_EXTENSION))
        || name.ends_with(SPEC_FILE_SUFFIX)
        || name == INFO_PLIST_FILENAME
}

/// Remove prebuilt frameworks and generator leftovers from each package's
/// `ios/` directory. Returns the number of removed entries.
pub fn clean_frameworks(packages: &[&Package]) -> Result<usize, FrameworkError> {
    let mut removed = 0;
    for pkg in packages {
        let ios_dir = pkg.ios_dir();
        if !ios_dir.is_dir() {
            continue;
        }

        let mut doomed = Vec::new();
        for entry in WalkDir::new(&ios_dir).min_depth(1).max_depth(1) {
            let entry = entry?;
            if is_generated_artifact(&entry.file_name().to_string_lossy()) {
                doomed.push((entry.file_type().is_dir(), entry.into_path()));
            }
        }

        for (is_dir, path) in doomed {
            tracing::debug!(package = %pkg.package_name, path = %path.display(), "removing");
            if is_dir {
                fs::remove_dir_all(&path)?;
            } else {
                fs::remove_file(&path)?;
            }
            removed += 1;
        }
    }
    Ok(removed)
}
