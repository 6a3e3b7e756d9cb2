//! Reports for best-effort, multi-step operations.

use std::fmt;

/// Independent steps of a full model teardown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeardownStep {
    Deactivate,
    Unregister,
    DeleteArtifacts,
}

impl fmt::Display for TeardownStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Deactivate => "deactivate",
            Self::Unregister => "unregister",
            Self::DeleteArtifacts => "delete_artifacts",
        };
        f.write_str(label)
    }
}

/// Outcome of one teardown step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    pub step: TeardownStep,
    /// `None` when the step succeeded.
    pub error: Option<String>,
}

impl StepReport {
    #[must_use]
    pub fn ok(step: TeardownStep) -> Self {
        Self { step, error: None }
    }

    pub fn failed(step: TeardownStep, error: impl fmt::Display) -> Self {
        Self {
            step,
            error: Some(error.to_string()),
        }
    }

    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Aggregated outcome of removing a model completely.
///
/// Every step runs regardless of earlier failures; the report lists which
/// ones left residue behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeardownReport {
    pub name: String,
    pub steps: Vec<StepReport>,
}

impl TeardownReport {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
        }
    }

    pub fn push(&mut self, step: StepReport) {
        self.steps.push(step);
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.steps.iter().all(StepReport::succeeded)
    }

    /// Steps that failed, in execution order.
    pub fn failures(&self) -> impl Iterator<Item = &StepReport> {
        self.steps.iter().filter(|step| !step.succeeded())
    }
}
