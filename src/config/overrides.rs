//! Command-line configuration layer

use std::path::PathBuf;

use serde_json::{Map, Value};

/// Settings passed as CLI flags (layer 4)
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub packages_dir: Option<PathBuf>,
    pub xcodegen: Option<String>,
    pub xcodebuild: Option<String>,
    pub pod: Option<String>,
    pub configuration: Option<String>,

    /// Replaces `prebuild.packages` when non-empty
    pub prebuild: Vec<String>,
}

impl CliOverrides {
    /// Overlay value for `EffectiveConfig::build`; `None` when no flag was given
    pub fn to_value(&self) -> Option<Value> {
        let mut overlay = Map::new();

        if let Some(dir) = &self.packages_dir {
            overlay.insert(
                "packages_dir".to_string(),
                Value::String(dir.display().to_string()),
            );
        }
        for (section, key, value) in [
            ("generator", "binary", &self.xcodegen),
            ("xcodebuild", "binary", &self.xcodebuild),
            ("cocoapods", "binary", &self.pod),
            ("xcodebuild", "configuration", &self.configuration),
        ] {
            if let Some(value) = value {
                insert_nested(&mut overlay, section, key, Value::String(value.clone()));
            }
        }
        if !self.prebuild.is_empty() {
            let packages = self.prebuild.iter().cloned().map(Value::String).collect();
            insert_nested(&mut overlay, "prebuild", "packages", Value::Array(packages));
        }

        (!overlay.is_empty()).then_some(Value::Object(overlay))
    }
}

fn insert_nested(overlay: &mut Map<String, Value>, section: &str, key: &str, value: Value) {
    let entry = overlay
        .entry(section)
        .or_insert_with(|| Value::Object(Map::new()));
    if let Value::Object(table) = entry {
        table.insert(key.to_string(), value);
    }
}
