#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Operation orchestration for sealpatch
//!
//! The one place privileged work is admitted, sequenced and reported.
//! Each public operation resolves the target volume fresh, compiles an
//! immutable step sequence, renders it, and dispatches it through a
//! single elevation request. A lifecycle lock guarantees at most one
//! operation is in flight; everything observable flows through events
//! and the bounded operation log.

mod context;
mod state;

pub use context::{OpsCtx, OpsCtxBuilder};
pub use state::OperationState;
