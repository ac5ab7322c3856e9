//! Artefacto inmutable del build: la imagen capturada y sus operaciones.
use std::fmt;
use std::sync::Arc;

use bake_core::{cancel, BuildError};
use bake_domain::Image;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::driver::Driver;

/// Identificador estable del builder que produjo el artefacto.
pub const BUILDER_ID: &str = "bakeflow.oci";

/// Clave reservada del lookup de estado: produce la metadata estructurada
/// para el registro externo de imágenes.
pub const ARTIFACT_STATE_REGISTRY_METADATA: &str = "bakeflow.registry.metadata";

/// Resultado inmutable de un build exitoso. La imagen vive del lado del
/// servidor; acá viajan su handle, la región y la operación de destrucción.
pub struct Artifact {
    image: Image,
    region: String,
    driver: Arc<dyn Driver>,
    /// Datos adicionales a compartir con post-procesadores.
    state_data: IndexMap<String, Value>,
}

/// Metadata que el registro externo consume. Derivación pura de los
/// atributos de la imagen: un campo ausente omite su etiqueta, nunca falla.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegistryImageMetadata {
    pub image_id: String,
    pub provider_name: &'static str,
    pub region: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_image_id: Option<String>,
    pub labels: IndexMap<String, String>,
}

impl Artifact {
    pub fn new(image: Image, region: impl Into<String>, driver: Arc<dyn Driver>, state_data: IndexMap<String, Value>) -> Self {
        Self { image,
               region: region.into(),
               driver,
               state_data }
    }

    pub fn builder_id(&self) -> &'static str {
        BUILDER_ID
    }

    /// OCID de la imagen asociada.
    pub fn id(&self) -> &str {
        &self.image.id
    }

    pub fn image(&self) -> &Image {
        &self.image
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// Borra la imagen asociada. Operación explícita del caller, posterior
    /// al build.
    pub async fn destroy(&self) -> Result<(), BuildError> {
        self.driver.delete_image(&cancel::never(), &self.image.id).await
    }

    /// Lookup de estado extensible. La clave reservada produce la metadata
    /// de registro; el resto sale de `state_data`.
    pub fn state(&self, name: &str) -> Option<Value> {
        if name == ARTIFACT_STATE_REGISTRY_METADATA {
            return serde_json::to_value(self.registry_metadata()).ok();
        }
        self.state_data.get(name).cloned()
    }

    /// Deriva las etiquetas de registro desde los atributos de la imagen,
    /// omitiendo todo campo opcional ausente. Determinista: el orden de
    /// inserción es fijo.
    pub fn registry_metadata(&self) -> RegistryImageMetadata {
        let mut labels: IndexMap<String, String> = IndexMap::new();

        if let Some(size) = self.image.billable_size_in_gbs {
            labels.insert("billable_size_in_gbs".to_string(), size.to_string());
        }
        if let Some(compartment) = &self.image.compartment_id {
            labels.insert("compartment_id".to_string(), compartment.clone());
        }
        if let Some(mode) = self.image.launch_mode {
            labels.insert("launch_mode".to_string(), mode.to_string());
        }
        if let Some(os) = &self.image.operating_system {
            labels.insert("operating_system".to_string(), os.clone());
        }
        if let Some(version) = &self.image.operating_system_version {
            labels.insert("operating_system_version".to_string(), version.clone());
        }

        RegistryImageMetadata { image_id: self.image.id.clone(),
                                provider_name: "oci",
                                region: self.region.clone(),
                                source_image_id: self.image.base_image_id.clone(),
                                labels }
    }
}

impl fmt::Debug for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Artifact")
         .field("image", &self.image)
         .field("region", &self.region)
         .field("state_data", &self.state_data)
         .finish_non_exhaustive()
    }
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let display_name = self.image.display_name.as_deref().unwrap_or_default();
        write!(f,
               "An image was created: '{}' (OCID: {}) in region '{}'",
               display_name, self.image.id, self.region)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::MockDriver;
    use bake_domain::{ImageLifecycleState, LaunchMode};

    fn full_image() -> Image {
        let mut image = Image::provisional("ocid1.image.oc1..abc").unwrap();
        image.display_name = Some("HelloWorld".to_string());
        image.compartment_id = Some("ocid1.compartment.oc1..comp".to_string());
        image.base_image_id = Some("ocid1.image.oc1..base".to_string());
        image.launch_mode = Some(LaunchMode::Native);
        image.operating_system = Some("Oracle Linux".to_string());
        image.operating_system_version = Some("8".to_string());
        image.billable_size_in_gbs = Some(47);
        image.lifecycle_state = ImageLifecycleState::Available;
        image
    }

    fn artifact_for(image: Image) -> (Artifact, Arc<MockDriver>) {
        let driver = Arc::new(MockDriver::new());
        let artifact = Artifact::new(image,
                                     "us-phoenix-1",
                                     Arc::clone(&driver) as Arc<dyn Driver>,
                                     IndexMap::new());
        (artifact, driver)
    }

    #[test]
    fn test_display_includes_name_id_and_region() {
        let (artifact, _driver) = artifact_for(full_image());
        assert_eq!(artifact.to_string(),
                   "An image was created: 'HelloWorld' (OCID: ocid1.image.oc1..abc) in region 'us-phoenix-1'");
    }

    #[test]
    fn test_registry_metadata_with_all_fields() {
        let (artifact, _driver) = artifact_for(full_image());
        let meta = artifact.registry_metadata();

        assert_eq!(meta.image_id, "ocid1.image.oc1..abc");
        assert_eq!(meta.provider_name, "oci");
        assert_eq!(meta.source_image_id.as_deref(), Some("ocid1.image.oc1..base"));
        let keys: Vec<&str> = meta.labels.keys().map(String::as_str).collect();
        assert_eq!(keys,
                   vec!["billable_size_in_gbs", "compartment_id", "launch_mode", "operating_system", "operating_system_version"]);
        assert_eq!(meta.labels["billable_size_in_gbs"], "47");
        assert_eq!(meta.labels["launch_mode"], "NATIVE");
    }

    #[test]
    fn test_registry_metadata_omits_unset_fields() {
        // Una imagen mínima no aporta etiquetas ni source: se omiten, no
        // fallan.
        let image = Image::provisional("ocid1.image.oc1..solo-id").unwrap();
        let (artifact, _driver) = artifact_for(image);
        let meta = artifact.registry_metadata();

        assert!(meta.labels.is_empty());
        assert_eq!(meta.source_image_id, None);

        let json = serde_json::to_value(&meta).unwrap();
        assert!(json.get("source_image_id").is_none());
    }

    #[test]
    fn test_state_lookup_reserved_key_and_state_data() {
        let mut state_data = IndexMap::new();
        state_data.insert("generated_data".to_string(), serde_json::json!({"x": 1}));
        let driver = Arc::new(MockDriver::new());
        let artifact = Artifact::new(full_image(),
                                     "us-phoenix-1",
                                     driver as Arc<dyn Driver>,
                                     state_data);

        let meta = artifact.state(ARTIFACT_STATE_REGISTRY_METADATA).unwrap();
        assert_eq!(meta["image_id"], "ocid1.image.oc1..abc");
        assert_eq!(artifact.state("generated_data").unwrap()["x"], 1);
        assert_eq!(artifact.state("missing"), None);
    }

    #[tokio::test]
    async fn test_destroy_deletes_the_image() {
        let (artifact, driver) = artifact_for(full_image());
        artifact.destroy().await.unwrap();
        assert_eq!(driver.delete_image_id().as_deref(), Some("ocid1.image.oc1..abc"));
    }
}
