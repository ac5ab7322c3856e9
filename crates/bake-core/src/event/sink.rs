use chrono::Utc;
use dashmap::DashMap;
use uuid::Uuid;

use super::{BuildEvent, BuildEventKind};

/// Registro de eventos append-only.
///
/// A diferencia del estado del build (un solo hilo lógico lo muta), el sink
/// se comparte entre builds concurrentes y con observadores, de ahí `&self`
/// y el requisito `Send + Sync`.
pub trait EventSink: Send + Sync {
    /// Agrega un evento a partir de su kind y devuelve el evento completo
    /// (con seq y ts).
    fn append(&self, build_id: Uuid, kind: BuildEventKind) -> BuildEvent;
    /// Lista los eventos de un build (orden ascendente por seq).
    fn list(&self, build_id: Uuid) -> Vec<BuildEvent>;

    /// Mensaje de progreso hacia el usuario.
    fn say(&self, build_id: Uuid, text: &str) {
        self.append(build_id, BuildEventKind::Message { text: text.to_string() });
    }

    /// Mensaje de error hacia el usuario.
    fn error(&self, build_id: Uuid, text: &str) {
        self.append(build_id, BuildEventKind::Error { text: text.to_string() });
    }
}

#[derive(Default)]
pub struct InMemoryEventSink {
    inner: DashMap<Uuid, Vec<BuildEvent>>,
}

impl InMemoryEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Textos de los eventos `Message` de un build, en orden. Conveniencia
    /// para tests y para el binario demo.
    pub fn messages(&self, build_id: Uuid) -> Vec<String> {
        self.list(build_id)
            .into_iter()
            .filter_map(|e| match e.kind {
                BuildEventKind::Message { text } => Some(text),
                _ => None,
            })
            .collect()
    }

    /// Textos de los eventos `Error` de un build, en orden.
    pub fn errors(&self, build_id: Uuid) -> Vec<String> {
        self.list(build_id)
            .into_iter()
            .filter_map(|e| match e.kind {
                BuildEventKind::Error { text } => Some(text),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for InMemoryEventSink {
    fn append(&self, build_id: Uuid, kind: BuildEventKind) -> BuildEvent {
        let mut events = self.inner.entry(build_id).or_default();
        let seq = events.len() as u64;
        let ev = BuildEvent { seq,
                              build_id,
                              kind,
                              ts: Utc::now() };
        events.push(ev.clone());
        ev
    }

    fn list(&self, build_id: Uuid) -> Vec<BuildEvent> {
        self.inner.get(&build_id).map(|v| v.value().clone()).unwrap_or_default()
    }
}
