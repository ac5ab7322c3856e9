//! Tipos de evento del build y estructura `BuildEvent`.
//!
//! Rol en el pipeline:
//! - El runner emite eventos a un `EventSink` append-only en cada
//!   transición (inicio, fin, alto y limpieza de cada step).
//! - Los steps emiten `Message`/`Error` como su único canal hacia el
//!   usuario; los eventos jamás alteran el flujo de control.
//! - El enum `BuildEventKind` es el contrato observable y estable del motor.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::BuildError;

/// Tipos de eventos que un build puede emitir.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum BuildEventKind {
    /// Arranque del pipeline: fija la cantidad de steps configurados.
    /// Invariante: debe ser el primer evento de un `build_id`.
    BuildStarted { step_count: usize },
    /// Un step comenzó su fase Run. No implica éxito.
    StepStarted { step_index: usize, step_id: String },
    /// Un step terminó su fase Run con `Continue`.
    StepFinished { step_index: usize, step_id: String },
    /// Un step señaló `Halt`. El pipeline no continúa (halt-on-error).
    StepHalted {
        step_index: usize,
        step_id: String,
        error: BuildError,
    },
    /// Comienza la limpieza compensatoria de un step ya iniciado.
    CleanupStarted { step_index: usize, step_id: String },
    /// Terminó la limpieza del step (con o sin error; los errores de
    /// limpieza viajan además como evento `Error` y en el RunReport).
    CleanupFinished { step_index: usize, step_id: String },
    /// Mensaje de progreso legible, emitido por un step.
    Message { text: String },
    /// Mensaje de error legible, emitido en el momento de la falla.
    Error { text: String },
    /// Evento de cierre: el drenado de limpieza ya corrió completo.
    BuildCompleted { halted: bool, cancelled: bool },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildEvent {
    pub seq: u64, // asignado por el EventSink (orden append por build)
    pub build_id: Uuid,
    pub kind: BuildEventKind,
    pub ts: DateTime<Utc>, // metadato de observabilidad
}
