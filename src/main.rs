//! pod-prebuild CLI
//!
//! Entry point for the `pod-prebuild` command-line tool.

use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use pod_prebuild::config::{self, CliOverrides, EffectiveConfig, ToolConfig};
use pod_prebuild::package::{self, PackageError};
use pod_prebuild::prebuilder::translate_options;
use pod_prebuild::{
    create_spec_from_podspec, discover_packages, generate_xcode_project, ChainResolver,
    CleanPrebuildsTask, Package, PackageManifest, Parcel, PrebuildPackagesTask, PrebuildPolicy,
    PrebuiltResolver, StaticResolver, TaskRunner, XcodePrebuilder,
};
use serde_json::Value;
use tracing::Level;

#[derive(Parser)]
#[command(name = "pod-prebuild")]
#[command(about = "Prebuild xcframeworks from podspecs via XcodeGen", version)]
struct Cli {
    /// Path to repo config file (default: .pod-prebuild.toml)
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Directory holding the packages (overrides `packages_dir`)
    #[arg(long, global = true)]
    packages_dir: Option<PathBuf>,

    /// xcodegen binary (overrides `generator.binary`)
    #[arg(long, global = true)]
    xcodegen: Option<String>,

    /// xcodebuild binary (overrides `xcodebuild.binary`)
    #[arg(long, global = true)]
    xcodebuild: Option<String>,

    /// CocoaPods binary (overrides `cocoapods.binary`)
    #[arg(long, global = true)]
    pod: Option<String>,

    /// Build configuration for archives (overrides `xcodebuild.configuration`)
    #[arg(long, global = true)]
    configuration: Option<String>,

    /// Prebuildable package; repeat to list several (overrides `prebuild.packages`)
    #[arg(long = "prebuild", value_name = "PACKAGE", global = true)]
    prebuild: Vec<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the XcodeGen spec for a podspec
    Spec {
        /// Podspec (.podspec or .podspec.json)
        podspec: PathBuf,

        /// Write to this file instead of stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Generate an Xcode project for a podspec
    Generate {
        /// Podspec (.podspec or .podspec.json)
        podspec: PathBuf,

        /// Output directory (default: the podspec's directory)
        #[arg(long, short = 'd')]
        dir: Option<PathBuf>,
    },

    /// Prebuild xcframeworks for prebuildable packages
    Prebuild {
        /// Package names (default: all discovered packages)
        packages: Vec<String>,
    },

    /// Remove prebuilt xcframeworks
    Clean {
        /// Package names (default: all discovered packages)
        packages: Vec<String>,
    },

    /// Print the effective configuration, or one value of it
    Config {
        /// Dot-separated key (e.g., generator.binary)
        key: Option<String>,
    },
}

impl Cli {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            packages_dir: self.packages_dir.clone(),
            xcodegen: self.xcodegen.clone(),
            xcodebuild: self.xcodebuild.clone(),
            pod: self.pod.clone(),
            configuration: self.configuration.clone(),
            prebuild: self.prebuild.clone(),
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let effective = match load_config(cli.config.as_deref(), &cli.overrides()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            process::exit(1);
        }
    };
    let tool = match effective.tool_config() {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            process::exit(1);
        }
    };
    let root = match std::env::current_dir() {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("Error: cannot determine working directory: {}", e);
            process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Spec { podspec, output } => run_spec(&tool, &root, &podspec, output).await,
        Commands::Generate { podspec, dir } => run_generate(&tool, &root, &podspec, dir).await,
        Commands::Prebuild { packages } => {
            run_tasks(&tool, &root, packages, TaskKind::Prebuild).await
        }
        Commands::Clean { packages } => {
            run_tasks(&tool, &root, packages, TaskKind::Clean).await
        }
        Commands::Config { key: None } => effective
            .to_json()
            .map(|json| println!("{}", json))
            .map_err(|e| e.to_string()),
        Commands::Config { key: Some(key) } => match effective.get(&key) {
            Some(Value::String(s)) => {
                println!("{}", s);
                Ok(())
            }
            Some(value) => {
                println!("{}", value);
                Ok(())
            }
            None => Err(format!("no configuration value at `{}`", key)),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(
    repo_config: Option<&Path>,
    overrides: &CliOverrides,
) -> Result<EffectiveConfig, config::ConfigError> {
    let host = config::host_config_path();
    let repo = repo_config
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(config::REPO_CONFIG_FILE));
    EffectiveConfig::build(host.as_deref(), Some(&repo), overrides.to_value())
}

/// Load a podspec on the blocking pool (`pod ipc spec` for Ruby podspecs)
async fn load_manifest(tool: &ToolConfig, podspec: &Path) -> Result<PackageManifest, String> {
    let podspec = podspec.to_path_buf();
    let pod = tool.cocoapods.binary.clone();
    tokio::task::spawn_blocking(move || package::load_manifest(&podspec, &pod))
        .await
        .map_err(|e| e.to_string())?
        .map_err(|e| e.to_string())
}

fn discover(tool: &ToolConfig, root: &Path) -> Result<Vec<Package>, PackageError> {
    discover_packages(&root.join(&tool.packages_dir))
}

fn resolver(tool: &ToolConfig, packages: &[Package]) -> ChainResolver {
    ChainResolver::new()
        .with(StaticResolver::new(tool.dependencies.clone()))
        .with(PrebuiltResolver::new(packages))
}

async fn run_spec(
    tool: &ToolConfig,
    root: &Path,
    podspec: &Path,
    output: Option<PathBuf>,
) -> Result<(), String> {
    let manifest = load_manifest(tool, podspec).await?;
    let packages = discover(tool, root).map_err(|e| e.to_string())?;
    let spec = create_spec_from_podspec(
        &manifest,
        &resolver(tool, &packages),
        &translate_options(tool, root),
    )
    .await
    .map_err(|e| e.to_string())?;

    let json = spec.to_json().map_err(|e| e.to_string())?;
    match output {
        Some(path) => {
            fs::write(&path, json).map_err(|e| e.to_string())?;
            eprintln!("Wrote: {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

async fn run_generate(
    tool: &ToolConfig,
    root: &Path,
    podspec: &Path,
    dir: Option<PathBuf>,
) -> Result<(), String> {
    let manifest = load_manifest(tool, podspec).await?;
    let packages = discover(tool, root).map_err(|e| e.to_string())?;
    let spec = create_spec_from_podspec(
        &manifest,
        &resolver(tool, &packages),
        &translate_options(tool, root),
    )
    .await
    .map_err(|e| e.to_string())?;

    let dir = dir
        .or_else(|| podspec.parent().map(Path::to_path_buf))
        .filter(|d| !d.as_os_str().is_empty())
        .unwrap_or_else(|| root.to_path_buf());
    let generator = tool.generator.clone();
    let project =
        tokio::task::spawn_blocking(move || generate_xcode_project(&dir, &spec, &generator))
            .await
            .map_err(|e| e.to_string())?
            .map_err(|e| e.to_string())?;
    println!("{}", project.display());
    Ok(())
}

enum TaskKind {
    Prebuild,
    Clean,
}

async fn run_tasks(
    tool: &ToolConfig,
    root: &Path,
    names: Vec<String>,
    kind: TaskKind,
) -> Result<(), String> {
    let packages = discover(tool, root).map_err(|e| e.to_string())?;

    let parcels: Vec<Parcel> = packages
        .iter()
        .filter(|pkg| names.is_empty() || names.contains(&pkg.package_name))
        .cloned()
        .map(Parcel::new)
        .collect();
    if !names.is_empty() && parcels.len() < names.len() {
        let unknown: Vec<&str> = names
            .iter()
            .filter(|name| !packages.iter().any(|pkg| pkg.package_name == **name))
            .map(String::as_str)
            .collect();
        return Err(format!("unknown package(s): {}", unknown.join(", ")));
    }

    let prebuilder = Arc::new(XcodePrebuilder::new(
        tool.clone(),
        root,
        Arc::new(resolver(tool, &packages)),
    ));
    let policy = PrebuildPolicy::new(tool.prebuild.packages.clone());
    let predicate = Arc::new(move |pkg: &Package| policy.can_prebuild(pkg));

    let runner = match kind {
        TaskKind::Prebuild => {
            TaskRunner::new().with(PrebuildPackagesTask::new(prebuilder, predicate))
        }
        TaskKind::Clean => {
            TaskRunner::new().with(CleanPrebuildsTask::new(prebuilder, predicate))
        }
    };

    runner.run(&parcels).await.map_err(|e| e.to_string())
}
