//! Source-agnostic domain types: models, containers, change sets.

pub mod change;
pub mod container;
pub mod id;
pub mod model;
pub mod report;

pub use change::{
    model_name_for_entry, model_name_for_path, FileChanges, ModelChanges, ModelEvent, SyncBatch,
};
pub use container::{
    ContainerPhase, ContainerRecord, ContainerState, ContainerSummary, SweepReport,
};
pub use id::ModelName;
pub use model::{ActiveModel, LoadedModel, ModelDescriptor, ModelHandle, ModelInfo, SourceKind};
pub use report::{StepReport, TeardownReport, TeardownStep};
