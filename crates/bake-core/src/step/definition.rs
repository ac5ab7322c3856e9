use async_trait::async_trait;

use super::{StepAction, StepContext};
use crate::errors::BuildError;

/// Trait que define un step del pipeline: una operación nombrada y falible
/// con fase Run y limpieza compensatoria Cleanup.
///
/// Contrato:
/// - Run observa y muta el estado `S`; señala `Continue` o `Halt { error }`.
///   Nunca debe entrar en pánico a través de esta frontera.
/// - Cleanup corre para todo step que fue iniciado, en orden inverso,
///   incondicionalmente (éxito, alto o cancelación). Una falla de Cleanup se
///   devuelve como valor; el runner la registra y sigue con el resto del
///   drenado, jamás re-dispara el pipeline.
#[async_trait]
pub trait BuildStep<S>: Send + Sync
    where S: Send
{
    /// Identificador estable y único dentro del pipeline.
    fn id(&self) -> &str;

    /// Fase principal del step.
    async fn run(&mut self, ctx: &StepContext, state: &mut S) -> StepAction;

    /// Limpieza compensatoria. Por defecto no hace nada.
    async fn cleanup(&mut self, _ctx: &StepContext, _state: &mut S) -> Result<(), BuildError> {
        Ok(())
    }
}
