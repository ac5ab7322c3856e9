//! Steps del pipeline de horneado: lanzamiento de la instancia, resolución
//! de su dirección y captura de la imagen. El orden lo fija el builder; las
//! dependencias entre steps viajan por el estado tipado.
pub mod image;
pub mod instance_ip;
pub mod launch;

pub use image::ImageStep;
pub use instance_ip::InstanceIpStep;
pub use launch::LaunchInstanceStep;

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;

    use bake_core::{cancel, EventSink, InMemoryEventSink, StepContext};
    use uuid::Uuid;

    use crate::config::BuildConfig;
    use crate::driver::{Driver, MockDriver};
    use crate::state::BuildState;

    /// Configuración mínima ya preparada, análoga a la de los tests de
    /// configuración.
    pub fn test_config() -> BuildConfig {
        let mut config = BuildConfig { availability_domain: "Uocm:PHX-AD-1".to_string(),
                                       compartment_id: "ocid1.compartment.oc1..aaaa".to_string(),
                                       shape: "VM.Standard2.1".to_string(),
                                       subnet_id: Some("ocid1.subnet.oc1..bbbb".to_string()),
                                       base_image_id: Some("ocid1.image.oc1..cccc".to_string()),
                                       image_name: Some("test-image".to_string()),
                                       ..Default::default() };
        config.prepare().expect("test config should prepare");
        config
    }

    /// Arma el trío (estado, mock, contexto) con el que corren los tests de
    /// steps.
    pub fn test_state(config: BuildConfig) -> (BuildState, Arc<MockDriver>, StepContext, Arc<InMemoryEventSink>) {
        let config = Arc::new(config);
        let driver = Arc::new(MockDriver::with_config(Arc::clone(&config)));
        let state = BuildState::new(Arc::clone(&driver) as Arc<dyn Driver>, config);
        let sink = Arc::new(InMemoryEventSink::new());
        let ctx = StepContext::new(Uuid::new_v4(), Arc::clone(&sink) as Arc<dyn EventSink>, cancel::never());
        (state, driver, ctx, sink)
    }
}
