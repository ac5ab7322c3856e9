//! Runner secuencial del pipeline.
//!
//! Ejecuta la lista ordenada de steps una sola vez, corta en el primer
//! `Halt` y drena la limpieza de todo step iniciado en orden inverso
//! estricto, pase lo que pase. El diseño es deliberadamente de un solo hilo
//! lógico: los steps tienen dependencias de orden (la instancia debe existir
//! antes de capturar una imagen) y la limpieza debe poder razonar sobre
//! "qué se inició" sin carreras.

use crate::errors::BuildError;
use crate::event::BuildEventKind;
use crate::step::{BuildStep, StepAction, StepContext};

/// Motor de ejecución de un build.
pub struct PipelineRunner<S> {
    steps: Vec<Box<dyn BuildStep<S>>>,
}

/// Resultado observable de una corrida completa (Run + drenado de Cleanup).
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// Error canónico del build: el del step que señaló `Halt`, o
    /// `Cancelled` si el alto vino de afuera. `None` en éxito.
    pub error: Option<BuildError>,
    /// Fallas de Cleanup, en el orden (inverso) en que se drenaron. Nunca
    /// reemplazan al error canónico.
    pub cleanup_errors: Vec<BuildError>,
    /// Índice del step que señaló `Halt`, si lo hubo.
    pub halted_at: Option<usize>,
    /// El build fue detenido por la señal externa de cancelación.
    pub cancelled: bool,
}

impl RunReport {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

impl<S: Send> PipelineRunner<S> {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Agrega un step al final del orden configurado.
    pub fn add_step(mut self, step: impl BuildStep<S> + 'static) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Ejecuta el pipeline completo contra `state`.
    ///
    /// Garantías (ver tests):
    /// - si el step k es el primero en señalar Halt, Cleanup corre para los
    ///   steps 0..=k en orden inverso y para ninguno posterior;
    /// - la cancelación se observa entre steps y el build cancelado igual
    ///   drena la limpieza completa de lo iniciado;
    /// - una falla de Cleanup se registra y no impide las limpiezas
    ///   restantes ni pisa el error canónico.
    pub async fn run(&mut self, ctx: &StepContext, state: &mut S) -> RunReport {
        ctx.emit(BuildEventKind::BuildStarted { step_count: self.steps.len() });

        let mut report = RunReport::default();
        let mut started = 0usize;

        for (index, step) in self.steps.iter_mut().enumerate() {
            if ctx.is_cancelled() {
                report.error = Some(BuildError::Cancelled);
                report.cancelled = true;
                break;
            }

            let step_id = step.id().to_string();
            ctx.emit(BuildEventKind::StepStarted { step_index: index,
                                                   step_id: step_id.clone() });
            started = index + 1;

            match step.run(ctx, state).await {
                StepAction::Continue => {
                    ctx.emit(BuildEventKind::StepFinished { step_index: index,
                                                            step_id });
                }
                StepAction::Halt { error } => {
                    ctx.emit(BuildEventKind::StepHalted { step_index: index,
                                                          step_id,
                                                          error: error.clone() });
                    report.error = Some(error);
                    report.halted_at = Some(index);
                    break;
                }
            }
        }

        // Drenado de limpieza: todo step iniciado, en orden inverso estricto.
        for (index, step) in self.steps[..started].iter_mut().enumerate().rev() {
            let step_id = step.id().to_string();
            ctx.emit(BuildEventKind::CleanupStarted { step_index: index,
                                                      step_id: step_id.clone() });
            if let Err(err) = step.cleanup(ctx, state).await {
                ctx.error(format!("Cleanup of step '{step_id}' failed: {err}"));
                report.cleanup_errors.push(err);
            }
            ctx.emit(BuildEventKind::CleanupFinished { step_index: index,
                                                       step_id });
        }

        ctx.emit(BuildEventKind::BuildCompleted { halted: report.error.is_some(),
                                                  cancelled: report.cancelled });
        report
    }
}

impl<S: Send> Default for PipelineRunner<S> {
    fn default() -> Self {
        Self::new()
    }
}
