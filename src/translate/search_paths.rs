//! Framework and header search path settings

use std::path::Path;

use indexmap::IndexSet;
use xcodegen_spec::{Dependency, INHERITED};

/// Pods whose public headers every prebuilt module may include
pub const COMMON_HEADER_PODS: [&str; 8] = [
    "DoubleConversion",
    "React-Core",
    "React-callinvoker",
    "React-cxxreact",
    "React-jsi",
    "React-jsiexecutor",
    "ReactCommon",
    "Yoga",
];

/// `$(inherited)` followed by the directory of every framework dependency.
/// Not deduplicated.
pub fn framework_search_paths(dependencies: &[Dependency]) -> String {
    let dirs = dependencies
        .iter()
        .filter_map(Dependency::framework_dir)
        .map(|dir| dir.to_string_lossy().into_owned());

    std::iter::once(INHERITED.to_string())
        .chain(dirs)
        .collect::<Vec<_>>()
        .join(" ")
}

/// `$(inherited)` followed by quoted public header directories for the
/// dependencies, the headers root itself and the common React Native pods.
pub fn header_search_paths<'a, I>(dependency_names: I, public_headers_dir: &Path) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let pods: IndexSet<&str> = dependency_names
        .into_iter()
        .chain(std::iter::once(""))
        .chain(COMMON_HEADER_PODS)
        .collect();

    let quoted = pods.into_iter().map(|pod| {
        let dir = if pod.is_empty() {
            public_headers_dir.to_path_buf()
        } else {
            public_headers_dir.join(pod)
        };
        format!("\"{}\"", dir.display())
    });

    std::iter::once(INHERITED.to_string())
        .chain(quoted)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_framework_paths_use_parent_dirs() {
        let deps = vec![
            Dependency::sdk("UIKit.framework"),
            Dependency::framework("/pkgs/core/ios/UMCore.xcframework"),
            Dependency::target("Local"),
            Dependency::framework("/pkgs/core/ios/UMOther.xcframework"),
        ];

        assert_eq!(
            framework_search_paths(&deps),
            "$(inherited) /pkgs/core/ios /pkgs/core/ios"
        );
    }

    #[test]
    fn test_framework_paths_empty() {
        assert_eq!(framework_search_paths(&[]), "$(inherited)");
    }

    #[test]
    fn test_header_paths_start_with_inherited_and_include_root() {
        let value = header_search_paths(["UMCore"], Path::new("/ios/Pods/Headers/Public"));

        assert!(value.starts_with("$(inherited) \""));
        assert!(value.contains("\"/ios/Pods/Headers/Public/UMCore\""));
        assert!(value.contains("\"/ios/Pods/Headers/Public\" "));
        assert!(value.contains("\"/ios/Pods/Headers/Public/Yoga\""));
    }

    #[test]
    fn test_header_paths_order_and_dedup() {
        let value = header_search_paths(["Yoga", "UMCore", "UMCore"], Path::new("/h"));

        assert_eq!(
            value,
            "$(inherited) \"/h/Yoga\" \"/h/UMCore\" \"/h\" \"/h/DoubleConversion\" \
             \"/h/React-Core\" \"/h/React-callinvoker\" \"/h/React-cxxreact\" \
             \"/h/React-jsi\" \"/h/React-jsiexecutor\" \"/h/ReactCommon\""
        );
    }
}
