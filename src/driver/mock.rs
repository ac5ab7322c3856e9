//! Driver simulado del plano de control.
//!
//! Guionable por operación (cada llamada puede fallar a pedido) y con
//! registro de los argumentos recibidos, para tests deterministas y para el
//! binario demo. Las esperas se sobreescriben: aquí no hay polling, sólo el
//! resultado guionado.
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bake_core::{BuildError, CancelSignal};
use bake_domain::{Image, ImageLifecycleState, InstanceLifecycleState};

use super::Driver;
use crate::config::BuildConfig;

/// Id fijo que el mock asigna a la instancia creada.
pub const MOCK_INSTANCE_ID: &str = "ocid1...";

#[derive(Debug, Default, Clone)]
struct MockInner {
    // Fallas guionadas por operación
    create_instance_err: Option<BuildError>,
    create_image_err: Option<BuildError>,
    update_schema_err: Option<BuildError>,
    delete_image_err: Option<BuildError>,
    get_instance_ip_err: Option<BuildError>,
    terminate_instance_err: Option<BuildError>,
    wait_for_image_creation_err: Option<BuildError>,
    wait_for_instance_state_err: Option<BuildError>,

    // Argumentos registrados
    create_instance_id: Option<String>,
    create_image_id: Option<String>,
    update_schema_id: Option<String>,
    delete_image_id: Option<String>,
    terminate_instance_id: Option<String>,
    captured_legacy_imds_endpoints_disabled: Option<bool>,
}

#[derive(Default)]
pub struct MockDriver {
    cfg: Option<Arc<BuildConfig>>,
    inner: Mutex<MockInner>,
}

impl MockDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mock atado a una configuración: de ahí salen el nombre de imagen, el
    /// compartimento y el toggle del endpoint legado que se captura al
    /// crear la instancia.
    pub fn with_config(cfg: Arc<BuildConfig>) -> Self {
        Self { cfg: Some(cfg),
               inner: Mutex::new(MockInner::default()) }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockInner> {
        // El lock sólo se envenena si un test entró en pánico con él tomado.
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    // -- Guionado de fallas (pueden fijarse también después de Run, para
    //    ejercitar fallas de limpieza) --

    pub fn fail_create_instance(&self, err: BuildError) {
        self.lock().create_instance_err = Some(err);
    }

    pub fn fail_create_image(&self, err: BuildError) {
        self.lock().create_image_err = Some(err);
    }

    pub fn fail_update_schema(&self, err: BuildError) {
        self.lock().update_schema_err = Some(err);
    }

    pub fn fail_delete_image(&self, err: BuildError) {
        self.lock().delete_image_err = Some(err);
    }

    pub fn fail_get_instance_ip(&self, err: BuildError) {
        self.lock().get_instance_ip_err = Some(err);
    }

    pub fn fail_terminate_instance(&self, err: BuildError) {
        self.lock().terminate_instance_err = Some(err);
    }

    pub fn fail_wait_for_image_creation(&self, err: BuildError) {
        self.lock().wait_for_image_creation_err = Some(err);
    }

    pub fn fail_wait_for_instance_state(&self, err: BuildError) {
        self.lock().wait_for_instance_state_err = Some(err);
    }

    // -- Argumentos registrados --

    pub fn create_instance_id(&self) -> Option<String> {
        self.lock().create_instance_id.clone()
    }

    pub fn create_image_id(&self) -> Option<String> {
        self.lock().create_image_id.clone()
    }

    pub fn update_schema_id(&self) -> Option<String> {
        self.lock().update_schema_id.clone()
    }

    pub fn delete_image_id(&self) -> Option<String> {
        self.lock().delete_image_id.clone()
    }

    pub fn terminate_instance_id(&self) -> Option<String> {
        self.lock().terminate_instance_id.clone()
    }

    /// Valor del toggle legado tal como llegó al pedido de creación (None
    /// si venía sin valor: el passthrough no inventa defaults).
    pub fn captured_legacy_imds_endpoints_disabled(&self) -> Option<bool> {
        self.lock().captured_legacy_imds_endpoints_disabled
    }
}

#[async_trait]
impl Driver for MockDriver {
    async fn create_instance(&self, _cancel: &CancelSignal, _public_key: &str) -> Result<String, BuildError> {
        let mut inner = self.lock();
        if let Some(err) = &inner.create_instance_err {
            return Err(err.clone());
        }
        inner.create_instance_id = Some(MOCK_INSTANCE_ID.to_string());
        // Captura lo que el pedido de lanzamiento reenvió desde la config.
        inner.captured_legacy_imds_endpoints_disabled =
            self.cfg.as_ref().and_then(|c| c.instance_options_are_legacy_imds_endpoints_disabled);
        Ok(MOCK_INSTANCE_ID.to_string())
    }

    async fn get_instance_ip(&self, _cancel: &CancelSignal, _instance_id: &str) -> Result<String, BuildError> {
        let inner = self.lock();
        if let Some(err) = &inner.get_instance_ip_err {
            return Err(err.clone());
        }
        if self.cfg.as_ref().is_some_and(|c| c.use_private_ip) {
            return Ok("private_ip".to_string());
        }
        Ok("ip".to_string())
    }

    async fn read_instance_state(&self, _cancel: &CancelSignal, _instance_id: &str) -> Result<InstanceLifecycleState, BuildError> {
        // Las esperas están sobreescritas; la sonda reporta un estado útil
        // por si alguien la consulta directo.
        Ok(InstanceLifecycleState::Running)
    }

    async fn read_image_state(&self, _cancel: &CancelSignal, _image_id: &str) -> Result<ImageLifecycleState, BuildError> {
        Ok(ImageLifecycleState::Available)
    }

    async fn terminate_instance(&self, _cancel: &CancelSignal, instance_id: &str) -> Result<(), BuildError> {
        let mut inner = self.lock();
        if let Some(err) = &inner.terminate_instance_err {
            return Err(err.clone());
        }
        inner.terminate_instance_id = Some(instance_id.to_string());
        Ok(())
    }

    async fn create_image(&self, _cancel: &CancelSignal, instance_id: &str) -> Result<Image, BuildError> {
        let mut inner = self.lock();
        if let Some(err) = &inner.create_image_err {
            return Err(err.clone());
        }
        inner.create_image_id = Some(instance_id.to_string());

        let mut image = Image::provisional("ocid1.image.oc1..mock").map_err(|e| BuildError::Internal(e.to_string()))?;
        if let Some(cfg) = &self.cfg {
            image.display_name = cfg.image_name.clone();
            image.compartment_id = Some(cfg.image_compartment().to_string());
            image.base_image_id = cfg.base_image_id.clone();
            image.launch_mode = cfg.launch_mode_parsed();
        }
        Ok(image)
    }

    async fn update_image_capability_schema(&self, _cancel: &CancelSignal, image_id: &str) -> Result<(), BuildError> {
        let mut inner = self.lock();
        if let Some(err) = &inner.update_schema_err {
            return Err(err.clone());
        }
        inner.update_schema_id = Some(image_id.to_string());
        Ok(())
    }

    async fn delete_image(&self, _cancel: &CancelSignal, image_id: &str) -> Result<(), BuildError> {
        let mut inner = self.lock();
        if let Some(err) = &inner.delete_image_err {
            return Err(err.clone());
        }
        inner.delete_image_id = Some(image_id.to_string());
        Ok(())
    }

    async fn wait_for_instance_state(&self,
                                     _cancel: &CancelSignal,
                                     _instance_id: &str,
                                     _wait_states: &[InstanceLifecycleState],
                                     _terminal_state: InstanceLifecycleState)
                                     -> Result<(), BuildError> {
        match &self.lock().wait_for_instance_state_err {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    async fn wait_for_image_creation(&self, _cancel: &CancelSignal, _image_id: &str) -> Result<(), BuildError> {
        match &self.lock().wait_for_image_creation_err {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}
