//! Domain models for the mobile version gate.
//!
//! - `EvaluationContext`: request-scoped view of a client's version against a snapshot
//! - `GateVerdict`: serializable outcome of an evaluation
//! - `GateError`: error taxonomy

pub mod error;
pub mod evaluation;
pub mod verdict;

pub use error::{GateError, Result};
pub use evaluation::EvaluationContext;
pub use verdict::GateVerdict;
