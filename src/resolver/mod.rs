//! Dependency resolution
//!
//! The translator never looks at package metadata itself. It asks a
//! `DependencyResolver` to turn each declared pod name into a target
//! dependency; `None` means "not resolvable" and the dependency is dropped.

use std::path::PathBuf;

use async_trait::async_trait;
use indexmap::IndexMap;
use xcodegen_spec::Dependency;

use crate::package::Package;

/// Name -> dependency descriptor lookup
#[async_trait]
pub trait DependencyResolver: Send + Sync {
    async fn resolve(&self, name: &str) -> Option<Dependency>;
}

/// Adapter turning a plain closure into a resolver
pub struct FnResolver<F>(pub F);

#[async_trait]
impl<F> DependencyResolver for FnResolver<F>
where
    F: Fn(&str) -> Option<Dependency> + Send + Sync,
{
    async fn resolve(&self, name: &str) -> Option<Dependency> {
        (self.0)(name)
    }
}

/// Resolves from a fixed table, typically the `[dependencies]` config section
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    table: IndexMap<String, Dependency>,
}

impl StaticResolver {
    pub fn new(table: IndexMap<String, Dependency>) -> Self {
        Self { table }
    }
}

#[async_trait]
impl DependencyResolver for StaticResolver {
    async fn resolve(&self, name: &str) -> Option<Dependency> {
        self.table.get(name).cloned()
    }
}

/// Resolves pods that belong to a known package with a prebuilt xcframework.
///
/// The framework is referenced but not linked: prebuilt targets are static
/// libraries, and linking happens in the consuming app.
#[derive(Debug, Clone, Default)]
pub struct PrebuiltResolver {
    frameworks: IndexMap<String, PathBuf>,
}

impl PrebuiltResolver {
    pub fn new(packages: &[Package]) -> Self {
        let frameworks = packages
            .iter()
            .filter_map(|pkg| {
                let pod = pkg.pod_name.as_ref()?;
                Some((pod.clone(), pkg.xcframework_path(pod)))
            })
            .collect();
        Self { frameworks }
    }
}

#[async_trait]
impl DependencyResolver for PrebuiltResolver {
    async fn resolve(&self, name: &str) -> Option<Dependency> {
        let path = self.frameworks.get(name)?;
        if !path.exists() {
            tracing::debug!(dependency = name, "no prebuilt framework at {}", path.display());
            return None;
        }
        Some(Dependency::framework(path.to_string_lossy()).link(false))
    }
}

/// Tries resolvers in order; the first answer wins
#[derive(Default)]
pub struct ChainResolver {
    resolvers: Vec<Box<dyn DependencyResolver>>,
}

impl ChainResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, resolver: impl DependencyResolver + 'static) -> Self {
        self.resolvers.push(Box::new(resolver));
        self
    }
}

#[async_trait]
impl DependencyResolver for ChainResolver {
    async fn resolve(&self, name: &str) -> Option<Dependency> {
        for resolver in &self.resolvers {
            if let Some(dependency) = resolver.resolve(name).await {
                return Some(dependency);
            }
        }
        None
    }
}
