//! XcodeGen invocation
//!
//! Writes the spec next to the sources as `<name>.spec.json`, runs
//! `xcodegen --quiet --spec <path>` with inherited stdio, and removes the
//! spec file whether or not the generator succeeds.

use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

use xcodegen_spec::ProjectSpec;

use crate::config::GeneratorConfig;
use crate::scoped::ScopedPath;

/// Generator errors
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    #[error("failed to write spec file {path}: {source}")]
    WriteSpec {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("failed to run `{binary}`: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: io::Error,
    },

    #[error("`{binary}` exited with {status}")]
    Failed { binary: String, status: ExitStatus },
}

/// Generate `<dir>/<name>.xcodeproj` from `spec`.
///
/// Returns the expected project path; whether the generator actually wrote
/// it is not checked.
pub fn generate_xcode_project(
    dir: &Path,
    spec: &ProjectSpec,
    config: &GeneratorConfig,
) -> Result<PathBuf, GeneratorError> {
    let spec_path = dir.join(spec.spec_file_name());
    let json = spec.to_json()?;
    let spec_file =
        ScopedPath::write(&spec_path, json).map_err(|source| GeneratorError::WriteSpec {
            path: spec_path.clone(),
            source,
        })?;

    let working_dir = config.working_dir.as_deref().unwrap_or(dir);
    tracing::info!(project = %spec.name, "generating Xcode project");

    let status = Command::new(&config.binary)
        .arg("--quiet")
        .arg("--spec")
        .arg(spec_file.path())
        .current_dir(working_dir)
        .status()
        .map_err(|source| GeneratorError::Spawn {
            binary: config.binary.clone(),
            source,
        })?;

    if !status.success() {
        return Err(GeneratorError::Failed {
            binary: config.binary.clone(),
            status,
        });
    }

    Ok(dir.join(spec.project_file_name()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use tempfile::TempDir;

    fn spec() -> ProjectSpec {
        ProjectSpec {
            name: "EXFoo".to_string(),
            targets: IndexMap::new(),
            ..Default::default()
        }
    }

    fn config(binary: &str) -> GeneratorConfig {
        GeneratorConfig {
            binary: binary.to_string(),
            ..Default::default()
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_success_returns_project_path_and_removes_spec() {
        let temp = TempDir::new().unwrap();

        let project = generate_xcode_project(temp.path(), &spec(), &config("true")).unwrap();

        assert_eq!(project, temp.path().join("EXFoo.xcodeproj"));
        assert!(!temp.path().join("EXFoo.spec.json").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_failure_still_removes_spec() {
        let temp = TempDir::new().unwrap();

        let err = generate_xcode_project(temp.path(), &spec(), &config("false")).unwrap_err();

        assert!(matches!(err, GeneratorError::Failed { .. }));
        assert!(!temp.path().join("EXFoo.spec.json").exists());
    }

    #[test]
    fn test_missing_binary_removes_spec() {
        let temp = TempDir::new().unwrap();

        let err = generate_xcode_project(
            temp.path(),
            &spec(),
            &config("/nonexistent/xcodegen"),
        )
        .unwrap_err();

        assert!(matches!(err, GeneratorError::Spawn { .. }));
        assert!(!temp.path().join("EXFoo.spec.json").exists());
    }
}
