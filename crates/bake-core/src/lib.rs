//! bake-core: motor secuencial de pipeline con limpieza compensatoria
pub mod cancel;
pub mod constants;
pub mod engine;
pub mod errors;
pub mod event;
pub mod poll;
pub mod step;

pub use cancel::{cancellation, never, CancelSignal};
pub use engine::{PipelineRunner, RunReport};
pub use errors::BuildError;
pub use event::{BuildEvent, BuildEventKind, EventSink, InMemoryEventSink};
pub use poll::{poll_until, PollConfig, PollState};
pub use step::{BuildStep, StepAction, StepContext};
