//! Concrete operator installed by the binary.

/// Infrastructure-backed implementation of every operator port.
#[derive(Debug, Clone, Copy, Default)]
pub struct Operator;

impl Operator {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}
