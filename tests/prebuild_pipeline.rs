//! Prebuild and clean tasks against a fake toolchain
//!
//! `xcodegen` and `xcodebuild` are replaced by shell scripts so the whole
//! podspec -> project -> xcframework flow runs without Xcode.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use pod_prebuild::config::ToolConfig;
use pod_prebuild::generator::GeneratorError;
use pod_prebuild::tasks::TaskError;
use pod_prebuild::{
    discover_packages, generate_xcode_project, CleanPrebuildsTask, Package, Parcel,
    PrebuildPackagesTask, PrebuildPolicy, PrebuiltResolver, TaskRunner, XcodePrebuilder,
};
use tempfile::TempDir;

const FAKE_XCODEGEN: &str = r#"#!/bin/sh
spec="$3"
dir=$(dirname "$spec")
cp "$spec" "$dir/captured-spec.json"
name=$(basename "$spec" .spec.json)
mkdir -p "$dir/$name.xcodeproj"
touch "$dir/Info-generated.plist"
"#;

const SLOW_XCODEGEN: &str = r#"#!/bin/sh
sleep 0.5
spec="$3"
dir=$(dirname "$spec")
name=$(basename "$spec" .spec.json)
mkdir -p "$dir/$name.xcodeproj"
"#;

const FAKE_XCODEBUILD: &str = r#"#!/bin/sh
for last; do :; done
if [ "$1" = "-create-xcframework" ]; then
  mkdir -p "$last/ios-arm64"
fi
echo "$@" >> "$(dirname "$0")/../xcodebuild.log"
"#;

const FAILING_XCODEGEN: &str = "#!/bin/sh\nexit 3\n";

fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, body).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn write_package(root: &Path, dir: &str, name: &str, podspec: &str) -> PathBuf {
    let path = root.join("packages").join(dir);
    fs::create_dir_all(path.join("ios")).unwrap();
    fs::write(path.join("package.json"), format!(r#"{{"name": "{}"}}"#, name)).unwrap();
    let manifest = format!(
        r#"{{
            "name": "{podspec}",
            "version": "4.2.0",
            "platforms": {{"ios": "13.0"}},
            "dependencies": {{"UMCore": [], "Unknown": []}},
            "source_files": "{podspec}/**/*.{{h,m}}"
        }}"#
    );
    fs::write(path.join("ios").join(format!("{}.podspec.json", podspec)), manifest).unwrap();
    path
}

struct Workspace {
    _temp: TempDir,
    root: PathBuf,
    config: ToolConfig,
}

fn workspace(xcodegen: &str) -> Workspace {
    let temp = TempDir::new().unwrap();
    let root = temp.path().to_path_buf();
    let bin = root.join("bin");
    fs::create_dir_all(&bin).unwrap();

    let mut config = ToolConfig::default();
    config.packages_dir = PathBuf::from("packages");
    config.generator.binary = write_script(&bin, "xcodegen", xcodegen).display().to_string();
    config.xcodebuild.binary = write_script(&bin, "xcodebuild", FAKE_XCODEBUILD)
        .display()
        .to_string();
    config.prebuild.packages = vec!["expo-location".to_string()];

    Workspace {
        _temp: temp,
        root,
        config,
    }
}

fn parcels(ws: &Workspace) -> (Vec<Package>, Vec<Parcel>) {
    let packages = discover_packages(&ws.root.join("packages")).unwrap();
    let parcels = packages.iter().cloned().map(Parcel::new).collect();
    (packages, parcels)
}

fn runner(ws: &Workspace, packages: &[Package], clean: bool) -> TaskRunner {
    let prebuilder = Arc::new(XcodePrebuilder::new(
        ws.config.clone(),
        &ws.root,
        Arc::new(PrebuiltResolver::new(packages)),
    ));
    let policy = PrebuildPolicy::new(ws.config.prebuild.packages.clone());
    let predicate = Arc::new(move |pkg: &Package| policy.can_prebuild(pkg));

    if clean {
        TaskRunner::new().with(CleanPrebuildsTask::new(prebuilder, predicate))
    } else {
        TaskRunner::new().with(PrebuildPackagesTask::new(prebuilder, predicate))
    }
}

// =============================================================================
// Prebuild: spec handed to xcodegen, project and archives cleaned up
// =============================================================================

#[tokio::test]
async fn test_prebuild_generates_and_builds_framework() {
    let ws = workspace(FAKE_XCODEGEN);
    let core = write_package(&ws.root, "core", "expo-core", "UMCore");
    let location = write_package(&ws.root, "location", "expo-location", "EXLocation");
    fs::create_dir_all(core.join("ios/UMCore.xcframework")).unwrap();

    let (packages, parcels) = parcels(&ws);
    runner(&ws, &packages, false).run(&parcels).await.unwrap();

    let ios = location.join("ios");
    assert!(ios.join("EXLocation.xcframework").is_dir());
    assert!(!ios.join("EXLocation.xcodeproj").exists());
    assert!(!ios.join("Info-generated.plist").exists());
    assert!(!ios.join("EXLocation.spec.json").exists());
    assert!(!ios.join(".EXLocation-archives").exists());

    // Only the listed package was prebuilt
    assert!(!core.join("ios/captured-spec.json").exists());

    let spec: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(ios.join("captured-spec.json")).unwrap())
            .unwrap();
    let deps = spec["targets"]["EXLocation"]["dependencies"].as_array().unwrap();
    assert_eq!(deps.len(), 1);
    assert!(deps[0]["framework"]
        .as_str()
        .unwrap()
        .ends_with("UMCore.xcframework"));
    assert_eq!(spec["options"]["deploymentTarget"]["iOS"], "13.0");
    assert_eq!(
        spec["targets"]["EXLocation"]["info"]["properties"]["CFBundleVersion"],
        "4"
    );

    let log = fs::read_to_string(ws.root.join("xcodebuild.log")).unwrap();
    assert_eq!(log.lines().filter(|l| l.starts_with("archive")).count(), 2);
    assert_eq!(log.lines().filter(|l| l.starts_with("-create-xcframework")).count(), 1);
}

// =============================================================================
// Generator failure: spec file still removed, task name reported
// =============================================================================

#[tokio::test]
async fn test_generator_failure_halts_pipeline() {
    let ws = workspace(FAILING_XCODEGEN);
    let location = write_package(&ws.root, "location", "expo-location", "EXLocation");

    let (packages, parcels) = parcels(&ws);
    let err = runner(&ws, &packages, false).run(&parcels).await.unwrap_err();

    match err {
        TaskError::Failed { task, source } => {
            assert_eq!(task, "prebuildPackages");
            assert!(matches!(
                *source,
                TaskError::Generator(GeneratorError::Failed { .. })
            ));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!location.join("ios/EXLocation.spec.json").exists());
}

// =============================================================================
// Toolchain subprocesses run off the async runtime
// =============================================================================

#[tokio::test(flavor = "current_thread")]
async fn test_prebuild_does_not_stall_runtime() {
    let ws = workspace(SLOW_XCODEGEN);
    let location = write_package(&ws.root, "location", "expo-location", "EXLocation");

    let ticks = Arc::new(AtomicUsize::new(0));
    let ticker = {
        let ticks = Arc::clone(&ticks);
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(Duration::from_millis(20)).await;
                ticks.fetch_add(1, Ordering::SeqCst);
            }
        })
    };

    let (packages, parcels) = parcels(&ws);
    runner(&ws, &packages, false).run(&parcels).await.unwrap();
    ticker.abort();

    assert!(location.join("ios/EXLocation.xcframework").is_dir());
    // xcodegen alone sleeps 500ms; a blocked single-threaded runtime would tick at most once
    assert!(ticks.load(Ordering::SeqCst) >= 5);
}

#[test]
fn test_generate_returns_expected_project_path() {
    let ws = workspace(FAKE_XCODEGEN);
    let out = ws.root.join("out");
    fs::create_dir_all(&out).unwrap();

    let spec = xcodegen_spec::ProjectSpec {
        name: "EXFoo".to_string(),
        ..Default::default()
    };
    let project = generate_xcode_project(&out, &spec, &ws.config.generator).unwrap();

    assert_eq!(project, out.join("EXFoo.xcodeproj"));
    assert!(project.is_dir());
    assert!(out.join("captured-spec.json").exists());
    assert!(!out.join("EXFoo.spec.json").exists());
}

// =============================================================================
// Clean
// =============================================================================

#[tokio::test]
async fn test_clean_removes_prebuilt_frameworks() {
    let ws = workspace(FAKE_XCODEGEN);
    let core = write_package(&ws.root, "core", "expo-core", "UMCore");
    let location = write_package(&ws.root, "location", "expo-location", "EXLocation");
    fs::create_dir_all(core.join("ios/UMCore.xcframework")).unwrap();
    fs::create_dir_all(location.join("ios/EXLocation.xcframework")).unwrap();

    let (packages, parcels) = parcels(&ws);
    runner(&ws, &packages, true).run(&parcels).await.unwrap();

    assert!(!location.join("ios/EXLocation.xcframework").exists());
    assert!(location.join("ios/EXLocation.podspec.json").exists());
    // Not prebuildable, left alone
    assert!(core.join("ios/UMCore.xcframework").exists());
}

#[tokio::test]
async fn test_clean_without_prebuildable_packages_is_noop() {
    let mut ws = workspace(FAKE_XCODEGEN);
    ws.config.prebuild.packages.clear();
    let location = write_package(&ws.root, "location", "expo-location", "EXLocation");
    fs::create_dir_all(location.join("ios/EXLocation.xcframework")).unwrap();

    let (packages, parcels) = parcels(&ws);
    runner(&ws, &packages, true).run(&parcels).await.unwrap();

    assert!(location.join("ios/EXLocation.xcframework").exists());
}
