//! Espera tipada por polling contra un recurso remoto eventualmente
//! consistente.
//!
//! Modela "esperar un estado" como un lazo explícito con intervalo, tope y
//! señal de cancelación, independiente del transporte: la sonda es una
//! clausura async que clasifica cada lectura en `Ready`, `Pending` o
//! `Terminal`. Una cancelación debe cortar el lazo en a lo sumo un
//! intervalo y propagarse como falla, nunca como éxito.

use std::future::Future;
use std::time::Duration;

use tokio::time::{sleep, Instant};

use crate::cancel::CancelSignal;
use crate::constants::{DEFAULT_POLL_INTERVAL_SECS, DEFAULT_WAIT_DEADLINE_SECS};
use crate::errors::BuildError;

/// Parámetros del lazo de espera.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Pausa entre sondas consecutivas.
    pub interval: Duration,
    /// Tope total de la espera; superarlo produce `WaitTimeout`.
    pub deadline: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self { interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
               deadline: Duration::from_secs(DEFAULT_WAIT_DEADLINE_SECS) }
    }
}

/// Resultado de una sonda individual dentro del lazo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollState<T> {
    /// El recurso alcanzó un estado aceptable.
    Ready(T),
    /// Todavía en tránsito; volver a sondear tras el intervalo.
    Pending,
    /// El recurso entró a un estado terminal inesperado (nombre incluido).
    Terminal(String),
}

/// Sondea hasta `Ready`, estado terminal, timeout o cancelación.
///
/// La sonda corre al menos una vez; el tope se evalúa después de cada
/// sonda, y la cancelación se observa durante la pausa (respuesta acotada
/// por un intervalo). Un error de la sonda corta el lazo de inmediato.
pub async fn poll_until<T, F, Fut>(config: &PollConfig, cancel: &CancelSignal, mut probe: F) -> Result<T, BuildError>
    where T: Send,
          F: FnMut() -> Fut + Send,
          Fut: Future<Output = Result<PollState<T>, BuildError>> + Send
{
    let mut cancel = cancel.clone();
    if *cancel.borrow() {
        return Err(BuildError::Cancelled);
    }

    let deadline = Instant::now() + config.deadline;
    let mut cancel_alive = true;

    loop {
        match probe().await? {
            PollState::Ready(value) => return Ok(value),
            PollState::Terminal(state) => return Err(BuildError::TerminalState(state)),
            PollState::Pending => {}
        }

        if Instant::now() >= deadline {
            return Err(BuildError::WaitTimeout(config.deadline.as_secs()));
        }

        tokio::select! {
            _ = sleep(config.interval) => {}
            changed = cancel.changed(), if cancel_alive => {
                match changed {
                    Ok(()) if *cancel.borrow() => return Err(BuildError::Cancelled),
                    Ok(()) => {}
                    // Emisor caído: ya no puede llegar señal; seguir sólo
                    // con el intervalo.
                    Err(_) => cancel_alive = false,
                }
            }
        }
    }
}
