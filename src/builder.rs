//! Fachada de orquestación del build.
//!
//! Arma la lista de steps en el orden con dependencias (instancia → IP →
//! imagen), corre el pipeline con el estado tipado y convierte el estado
//! final en el artefacto. Cada build es independiente: builds concurrentes
//! comparten a lo sumo el sink y el driver, nunca el estado.
use std::sync::Arc;

use bake_core::{BuildError, CancelSignal, EventSink, PipelineRunner, StepContext};
use indexmap::IndexMap;
use uuid::Uuid;

use crate::artifact::Artifact;
use crate::config::BuildConfig;
use crate::driver::Driver;
use crate::state::BuildState;
use crate::steps::{ImageStep, InstanceIpStep, LaunchInstanceStep};

pub struct ImageBuilder {
    config: Arc<BuildConfig>,
    driver: Arc<dyn Driver>,
    events: Arc<dyn EventSink>,
}

impl ImageBuilder {
    /// La configuración debe llegar ya preparada (`BuildConfig::prepare`).
    pub fn new(config: Arc<BuildConfig>, driver: Arc<dyn Driver>, events: Arc<dyn EventSink>) -> Self {
        Self { config,
               driver,
               events }
    }

    /// Corre el pipeline completo de un build.
    ///
    /// Devuelve el artefacto si se capturó una imagen, `None` si la captura
    /// fue salteada por configuración, o el error canónico del build. Las
    /// fallas de limpieza no escalan: quedan reportadas en el registro de
    /// eventos.
    pub async fn run(&self, build_id: Uuid, public_key: &str, cancel: CancelSignal) -> Result<Option<Artifact>, BuildError> {
        let ctx = StepContext::new(build_id, Arc::clone(&self.events), cancel);
        let mut state = BuildState::new(Arc::clone(&self.driver), Arc::clone(&self.config))
            .with_public_key(public_key);

        let mut runner = PipelineRunner::new()
            .add_step(LaunchInstanceStep)
            .add_step(InstanceIpStep)
            .add_step(ImageStep { skip_create_image: self.config.skip_create_image });

        let report = runner.run(&ctx, &mut state).await;
        if let Some(error) = report.error {
            return Err(error);
        }

        match state.image.take() {
            Some(image) => Ok(Some(Artifact::new(image,
                                                 self.config.region(),
                                                 Arc::clone(&self.driver),
                                                 IndexMap::new()))),
            None => {
                self.events.say(build_id, "The build produced no image (image creation was skipped).");
                Ok(None)
            }
        }
    }
}
