use std::sync::Arc;

use uuid::Uuid;

use crate::cancel::{self, CancelSignal};
use crate::event::{BuildEventKind, EventSink};

/// Contexto entregado a las fases Run y Cleanup de cada step.
///
/// Agrupa lo que es propio de la corrida y no del dominio: identidad del
/// build, el registro de eventos y la señal de cancelación. Los datos de
/// dominio (driver, configuración, ids intermedios) viajan en el estado
/// tipado del pipeline, no aquí.
pub struct StepContext {
    build_id: Uuid,
    events: Arc<dyn EventSink>,
    cancel: CancelSignal,
}

impl StepContext {
    pub fn new(build_id: Uuid, events: Arc<dyn EventSink>, cancel: CancelSignal) -> Self {
        Self { build_id,
               events,
               cancel }
    }

    pub fn build_id(&self) -> Uuid {
        self.build_id
    }

    pub fn events(&self) -> Arc<dyn EventSink> {
        Arc::clone(&self.events)
    }

    /// Emite un evento estructurado de este build.
    pub fn emit(&self, kind: BuildEventKind) {
        self.events.append(self.build_id, kind);
    }

    /// Mensaje de progreso hacia el usuario.
    pub fn say(&self, text: impl AsRef<str>) {
        self.events.say(self.build_id, text.as_ref());
    }

    /// Mensaje de error hacia el usuario.
    pub fn error(&self, text: impl AsRef<str>) {
        self.events.error(self.build_id, text.as_ref());
    }

    /// Señal de cancelación para propagar a las esperas del driver.
    pub fn cancel_signal(&self) -> &CancelSignal {
        &self.cancel
    }

    pub fn is_cancelled(&self) -> bool {
        cancel::is_cancelled(&self.cancel)
    }
}
