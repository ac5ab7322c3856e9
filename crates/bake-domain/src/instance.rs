//! Estados de ciclo de vida de una instancia de cómputo.
//!
//! El plano de control reporta estos estados durante el aprovisionamiento y
//! el desmantelamiento. El orquestador sólo observa transiciones: nunca
//! modela estados de falla de la instancia como datos propios (una falla
//! llega siempre como error del driver o timeout del poll).
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::DomainError;

/// Estados que una instancia puede reportar en el plano de control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstanceLifecycleState {
    Provisioning,
    Starting,
    Running,
    Stopping,
    Stopped,
    Terminating,
    Terminated,
}

impl InstanceLifecycleState {
    /// Forma canónica (la que usa la API remota).
    pub fn as_str(&self) -> &'static str {
        match self {
            InstanceLifecycleState::Provisioning => "PROVISIONING",
            InstanceLifecycleState::Starting => "STARTING",
            InstanceLifecycleState::Running => "RUNNING",
            InstanceLifecycleState::Stopping => "STOPPING",
            InstanceLifecycleState::Stopped => "STOPPED",
            InstanceLifecycleState::Terminating => "TERMINATING",
            InstanceLifecycleState::Terminated => "TERMINATED",
        }
    }

    /// Indica si el estado es terminal (la instancia ya no volverá a correr).
    pub fn is_terminal(&self) -> bool {
        matches!(self, InstanceLifecycleState::Terminated)
    }
}

impl fmt::Display for InstanceLifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InstanceLifecycleState {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "PROVISIONING" => Ok(InstanceLifecycleState::Provisioning),
            "STARTING" => Ok(InstanceLifecycleState::Starting),
            "RUNNING" => Ok(InstanceLifecycleState::Running),
            "STOPPING" => Ok(InstanceLifecycleState::Stopping),
            "STOPPED" => Ok(InstanceLifecycleState::Stopped),
            "TERMINATING" => Ok(InstanceLifecycleState::Terminating),
            "TERMINATED" => Ok(InstanceLifecycleState::Terminated),
            other => Err(DomainError::ValidationError(format!("unknown instance lifecycle state: {other}"))),
        }
    }
}
