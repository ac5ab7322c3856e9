pub mod sink;
pub mod types;

pub use sink::{EventSink, InMemoryEventSink};
pub use types::{BuildEvent, BuildEventKind};
