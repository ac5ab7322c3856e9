//! Señal de cancelación compartida entre el runner y los lazos de espera.
//!
//! Se usa un canal `watch` booleano: el emisor marca `true` una sola vez y
//! cada receptor lo observa entre steps y dentro de cada sonda de polling.

use tokio::sync::watch;

/// Receptor de la señal de cancelación de un build.
pub type CancelSignal = watch::Receiver<bool>;

/// Crea el par (emisor, señal) para un build. El emisor envía `true` para
/// pedir el alto; el valor nunca vuelve a `false`.
pub fn cancellation() -> (watch::Sender<bool>, CancelSignal) {
    watch::channel(false)
}

/// Señal que jamás se dispara. La usa la fase Cleanup: un build cancelado
/// igual debe desmantelar lo que alcanzó a crear.
pub fn never() -> CancelSignal {
    let (_tx, rx) = watch::channel(false);
    rx
}

/// Lectura puntual, sin esperar.
pub fn is_cancelled(signal: &CancelSignal) -> bool {
    *signal.borrow()
}
