//! Prebuild and clean tasks
//!
//! Tasks receive the list of parcels being published and only produce side
//! effects. Each declares whether it is required and whether its effects can
//! be backed up and restored by the runner.

use std::sync::Arc;

use async_trait::async_trait;

use crate::frameworks::FrameworkError;
use crate::generator::GeneratorError;
use crate::package::{Package, PackageError, Parcel};
use crate::translate::TranslateError;

/// Task errors
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error("package error: {0}")]
    Package(#[from] PackageError),

    #[error("translation error: {0}")]
    Translate(#[from] TranslateError),

    #[error("generator error: {0}")]
    Generator(#[from] GeneratorError),

    #[error("framework error: {0}")]
    Framework(#[from] FrameworkError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("toolchain step did not complete: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("task `{task}` failed: {source}")]
    Failed {
        task: &'static str,
        #[source]
        source: Box<TaskError>,
    },
}

/// Static description of a task for the runner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskDescriptor {
    pub name: &'static str,
    pub required: bool,
    pub backupable: bool,
}

#[async_trait]
pub trait Task: Send + Sync {
    fn descriptor(&self) -> TaskDescriptor;

    async fn run(&self, parcels: &[Parcel]) -> Result<(), TaskError>;
}

/// The side-effecting work behind the tasks
#[async_trait]
pub trait Prebuilder: Send + Sync {
    async fn prebuild(&self, pkg: &Package) -> Result<(), TaskError>;

    async fn clean(&self, packages: &[&Package]) -> Result<(), TaskError>;
}

/// "Is this package prebuildable?"
pub type PrebuildPredicate = Arc<dyn Fn(&Package) -> bool + Send + Sync>;

fn prebuildable<'a>(parcels: &'a [Parcel], predicate: &PrebuildPredicate) -> Vec<&'a Package> {
    parcels
        .iter()
        .map(|parcel| &parcel.pkg)
        .filter(|pkg| predicate(pkg))
        .collect()
}

/// Prebuilds every prebuildable package, one at a time
pub struct PrebuildPackagesTask {
    prebuilder: Arc<dyn Prebuilder>,
    predicate: PrebuildPredicate,
}

impl PrebuildPackagesTask {
    pub const DESCRIPTOR: TaskDescriptor = TaskDescriptor {
        name: "prebuildPackages",
        required: false,
        backupable: false,
    };

    pub fn new(prebuilder: Arc<dyn Prebuilder>, predicate: PrebuildPredicate) -> Self {
        Self {
            prebuilder,
            predicate,
        }
    }
}

#[async_trait]
impl Task for PrebuildPackagesTask {
    fn descriptor(&self) -> TaskDescriptor {
        Self::DESCRIPTOR
    }

    async fn run(&self, parcels: &[Parcel]) -> Result<(), TaskError> {
        for parcel in parcels.iter().filter(|parcel| (self.predicate)(&parcel.pkg)) {
            tracing::info!("prebuilding {}", parcel.label());
            self.prebuilder.prebuild(&parcel.pkg).await?;
        }
        Ok(())
    }
}

/// Removes prebuilt artifacts of every prebuildable package in one batch
pub struct CleanPrebuildsTask {
    prebuilder: Arc<dyn Prebuilder>,
    predicate: PrebuildPredicate,
}

impl CleanPrebuildsTask {
    pub const DESCRIPTOR: TaskDescriptor = TaskDescriptor {
        name: "cleanPrebuilds",
        required: false,
        backupable: false,
    };

    pub fn new(prebuilder: Arc<dyn Prebuilder>, predicate: PrebuildPredicate) -> Self {
        Self {
            prebuilder,
            predicate,
        }
    }
}

#[async_trait]
impl Task for CleanPrebuildsTask {
    fn descriptor(&self) -> TaskDescriptor {
        Self::DESCRIPTOR
    }

    async fn run(&self, parcels: &[Parcel]) -> Result<(), TaskError> {
        let packages = prebuildable(parcels, &self.predicate);
        if packages.is_empty() {
            return Ok(());
        }
        self.prebuilder.clean(&packages).await
    }
}

/// Runs tasks in order; the first failure halts the pipeline
#[derive(Default)]
pub struct TaskRunner {
    tasks: Vec<Box<dyn Task>>,
}

impl TaskRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, task: impl Task + 'static) -> Self {
        self.tasks.push(Box::new(task));
        self
    }

    pub fn descriptors(&self) -> Vec<TaskDescriptor> {
        self.tasks.iter().map(|task| task.descriptor()).collect()
    }

    pub async fn run(&self, parcels: &[Parcel]) -> Result<(), TaskError> {
        for task in &self.tasks {
            let descriptor = task.descriptor();
            tracing::debug!(task = descriptor.name, parcels = parcels.len(), "running task");
            task.run(parcels).await.map_err(|source| TaskError::Failed {
                task: descriptor.name,
                source: Box::new(source),
            })?;
        }
        Ok(())
    }
}
