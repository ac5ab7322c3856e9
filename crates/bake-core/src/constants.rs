//! Constantes del motor.

/// Intervalo por defecto entre sondas de estado remoto.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

/// Tope por defecto de una espera de transición de estado. Las capturas de
/// imagen pueden tardar decenas de minutos en regiones cargadas.
pub const DEFAULT_WAIT_DEADLINE_SECS: u64 = 1800;
