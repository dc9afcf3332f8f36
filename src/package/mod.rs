//! Packages and parcels
//!
//! A package is a directory with a `package.json` and, when it ships native
//! code, a podspec under `ios/`. A parcel is the package entry handed to the
//! prebuild and clean tasks.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde::Deserialize;
use walkdir::WalkDir;
use xcodegen_spec::{ManifestError, PackageManifest};

const PODSPEC_EXTENSION: &str = ".podspec";
const PODSPEC_JSON_EXTENSION: &str = ".podspec.json";

/// Errors for package discovery and manifest loading
#[derive(Debug, thiserror::Error)]
pub enum PackageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("invalid package.json at {path}: {source}")]
    PackageJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("package `{0}` has no podspec")]
    NoPodspec(String),

    #[error("failed to run `{binary}`: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`pod ipc spec {path}` failed: {stderr}")]
    PodIpc { path: PathBuf, stderr: String },

    #[error("manifest error: {0}")]
    Manifest(#[from] ManifestError),
}

#[derive(Debug, Deserialize)]
struct PackageJson {
    name: String,
    #[serde(default)]
    version: Option<String>,
}

/// A publishable package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    /// Name from package.json (e.g., "expo-location")
    pub package_name: String,

    /// Version from package.json, if declared
    pub version: Option<String>,

    /// Package root directory
    pub path: PathBuf,

    /// Podspec under `ios/`, when the package has native code
    pub podspec_path: Option<PathBuf>,

    /// Pod name derived from the podspec file name
    pub pod_name: Option<String>,
}

impl Package {
    /// Read a package directory; `Ok(None)` if it has no package.json
    pub fn from_dir(path: &Path) -> Result<Option<Self>, PackageError> {
        let package_json = path.join("package.json");
        if !package_json.is_file() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&package_json)?;
        let parsed: PackageJson =
            serde_json::from_str(&contents).map_err(|source| PackageError::PackageJson {
                path: package_json.clone(),
                source,
            })?;

        let podspec_path = find_podspec(&path.join("ios"))?;
        let pod_name = podspec_path.as_deref().and_then(pod_name_from_path);

        Ok(Some(Self {
            package_name: parsed.name,
            version: parsed.version,
            path: path.to_path_buf(),
            podspec_path,
            pod_name,
        }))
    }

    /// Directory holding the native iOS sources
    pub fn ios_dir(&self) -> PathBuf {
        self.path.join("ios")
    }

    /// Where the prebuilt framework for `pod` lives
    pub fn xcframework_path(&self, pod: &str) -> PathBuf {
        self.ios_dir().join(format!("{}.xcframework", pod))
    }

    /// Load this package's podspec
    pub fn load_manifest(&self, pod_binary: &str) -> Result<PackageManifest, PackageError> {
        let podspec = self
            .podspec_path
            .as_deref()
            .ok_or_else(|| PackageError::NoPodspec(self.package_name.clone()))?;
        load_manifest(podspec, pod_binary)
    }
}

/// Load a podspec: JSON podspecs directly, Ruby ones via `pod ipc spec`
pub fn load_manifest(podspec: &Path, pod_binary: &str) -> Result<PackageManifest, PackageError> {
    let name = podspec.to_string_lossy();
    if name.ends_with(PODSPEC_JSON_EXTENSION) {
        return Ok(PackageManifest::from_file(podspec)?);
    }

    tracing::debug!(podspec = %podspec.display(), "evaluating podspec with `{} ipc spec`", pod_binary);
    let output = Command::new(pod_binary)
        .args(["ipc", "spec"])
        .arg(podspec)
        .output()
        .map_err(|source| PackageError::Spawn {
            binary: pod_binary.to_string(),
            source,
        })?;

    if !output.status.success() {
        return Err(PackageError::PodIpc {
            path: podspec.to_path_buf(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    let json = String::from_utf8_lossy(&output.stdout);
    Ok(PackageManifest::from_json_str(&json)?)
}

fn find_podspec(ios_dir: &Path) -> Result<Option<PathBuf>, PackageError> {
    if !ios_dir.is_dir() {
        return Ok(None);
    }

    let mut candidates = Vec::new();
    for entry in WalkDir::new(ios_dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry?;
        let is_podspec = {
            let name = entry.file_name().to_string_lossy();
            name.ends_with(PODSPEC_EXTENSION) || name.ends_with(PODSPEC_JSON_EXTENSION)
        };
        if entry.file_type().is_file() && is_podspec {
            candidates.push(entry.into_path());
        }
    }

    if candidates.len() > 1 {
        tracing::warn!(dir = %ios_dir.display(), "multiple podspecs found, using the first");
    }
    Ok(candidates.into_iter().next())
}

fn pod_name_from_path(path: &Path) -> Option<String> {
    let file_name = path.file_name()?.to_str()?;
    file_name
        .strip_suffix(PODSPEC_JSON_EXTENSION)
        .or_else(|| file_name.strip_suffix(PODSPEC_EXTENSION))
        .map(str::to_string)
}

/// Discover packages in the immediate children of `root`, sorted by name
pub fn discover_packages(root: &Path) -> Result<Vec<Package>, PackageError> {
    let mut packages = Vec::new();
    for entry in WalkDir::new(root).min_depth(1).max_depth(1) {
        let entry = entry?;
        if !entry.file_type().is_dir() {
            continue;
        }
        if let Some(pkg) = Package::from_dir(entry.path())? {
            packages.push(pkg);
        }
    }
    packages.sort_by(|a, b| a.package_name.cmp(&b.package_name));
    Ok(packages)
}

/// A package entry handed to pipeline tasks
#[derive(Debug, Clone)]
pub struct Parcel {
    pub pkg: Package,
}

impl Parcel {
    pub fn new(pkg: Package) -> Self {
        Self { pkg }
    }

    /// `name@version` for log lines; just the name when unversioned
    pub fn label(&self) -> String {
        match &self.pkg.version {
            Some(version) => format!("{}@{}", self.pkg.package_name, version),
            None => self.pkg.package_name.clone(),
        }
    }
}

/// Which packages may be prebuilt
#[derive(Debug, Clone, Default)]
pub struct PrebuildPolicy {
    packages: Vec<String>,
}

impl PrebuildPolicy {
    pub fn new(packages: Vec<String>) -> Self {
        Self { packages }
    }

    /// True if the package is listed and ships a podspec
    pub fn can_prebuild(&self, pkg: &Package) -> bool {
        pkg.podspec_path.is_some() && self.packages.iter().any(|p| *p == pkg.package_name)
    }
}
