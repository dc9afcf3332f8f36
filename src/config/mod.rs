//! Configuration
//!
//! Two unrelated merges live here:
//! - Tool configuration, layered in 4 steps:
//!   1. Built-in defaults
//!   2. Host/user config (~/.config/pod-prebuild/config.toml)
//!   3. Repo config (.pod-prebuild.toml)
//!   4. CLI flags
//! - Xcode build-setting maps, merged with `$(inherited)` handling

mod defaults;
mod effective;
mod merge;
mod overrides;
mod xcconfig;

pub use defaults::{
    CocoapodsConfig, GeneratorConfig, HeadersConfig, PrebuildConfig, ToolConfig,
    XcodebuildConfig,
};
pub use effective::{ConfigError, ConfigOrigin, ConfigSource, EffectiveConfig};
pub use merge::{deep_merge, merge_layers};
pub use overrides::CliOverrides;
pub use xcconfig::{merge_configs, merge_value};

/// Default location of the host config file
pub fn host_config_path() -> Option<std::path::PathBuf> {
    std::env::var_os("HOME").map(|home| {
        std::path::PathBuf::from(home)
            .join(".config")
            .join("pod-prebuild")
            .join("config.toml")
    })
}

/// Default location of the repo config file
pub const REPO_CONFIG_FILE: &str = ".pod-prebuild.toml";
