//! Errores del pipeline: un único error canónico por build.
//!
//! Toda falla de un step viaja como valor dentro de `StepAction::Halt` y el
//! runner la conserva como el error canónico del build; las fallas de
//! Cleanup se acumulan aparte y nunca lo enmascaran.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub enum BuildError {
    #[error("precondition not satisfied: {0}")] Precondition(String),
    #[error("control plane call failed: {0}")] ControlPlane(String),
    #[error("resource entered terminal state {0}")] TerminalState(String),
    #[error("wait timed out after {0}s")] WaitTimeout(u64),
    #[error("build cancelled")] Cancelled,
    #[error("cleanup failed: {0}")] Cleanup(String),
    #[error("internal: {0}")] Internal(String),
}
