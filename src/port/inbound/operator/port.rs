//! Unified operator capability surface for inbound adapters.

use super::diagnostic::DiagnosticOperator;
use super::inventory::InventoryOperator;
use super::runtime::RuntimeOperator;

/// Unified operator capability surface consumed by inbound adapters.
pub trait OperatorPort: DiagnosticOperator + InventoryOperator + RuntimeOperator {}

impl<T> OperatorPort for T where T: DiagnosticOperator + InventoryOperator + RuntimeOperator {}
