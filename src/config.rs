//! Configuración validada del build.
//!
//! Se construye una sola vez antes de arrancar el pipeline y el pipeline la
//! trata como de sólo lectura. `prepare()` acumula todos los problemas de
//! validación antes de reportarlos (el operador corrige todo en una pasada),
//! rellena los valores por defecto (nombre de imagen, compartimento de la
//! imagen, filtro de imagen base) y normaliza el user data a base64.
//! La carga de credenciales queda fuera: este módulo sólo exige los campos
//! de ubicación que el plano de control necesita.
use std::env;
use std::path::PathBuf;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use bake_domain::{LaunchMode, NicAttachmentType};
use chrono::Utc;
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Región usada cuando ni la configuración ni el entorno definen una.
pub const FALLBACK_REGION: &str = "us-phoenix-1";

/// Longitud máxima (tras trim) de clave y valor de una etiqueta.
const MAX_TAG_LEN: usize = 100;

/// Sección de entorno, evaluada una sola vez. Cargar `.env` es tarea del
/// binario (vía dotenvy) antes del primer acceso.
pub static ENV: Lazy<EnvConfig> = Lazy::new(|| EnvConfig { region: env::var("BAKEFLOW_REGION").ok() });

/// Valores que pueden llegar por entorno en lugar de por configuración.
pub struct EnvConfig {
    /// Región por defecto (`BAKEFLOW_REGION`).
    pub region: Option<String>,
}

/// Error de validación de configuración: todos los problemas juntos.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid configuration: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

/// Campos anidables bajo `create_vnic_details`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateVnicDetails {
    pub assign_public_ip: Option<bool>,
    pub display_name: Option<String>,
    pub hostname_label: Option<String>,
    pub nsg_ids: Vec<String>,
    pub private_ip: Option<String>,
    pub skip_source_dest_check: Option<bool>,
    pub subnet_id: Option<String>,
    pub tags: IndexMap<String, String>,
}

/// Filtro para elegir la imagen base cuando no se da un id explícito.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaseImageFilter {
    pub compartment_id: Option<String>,
    pub display_name: Option<String>,
    pub display_name_search: Option<String>,
    pub operating_system: Option<String>,
    pub operating_system_version: Option<String>,
    pub shape: Option<String>,
}

/// Dimensionamiento de shapes flexibles.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FlexShapeConfig {
    pub ocpus: Option<f32>,
    pub memory_in_gbs: Option<f32>,
    pub baseline_ocpu_utilization: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    // Ubicación
    /// Región del plano de control. Si falta se toma de `BAKEFLOW_REGION` y,
    /// en último término, de `FALLBACK_REGION`.
    pub region: Option<String>,
    pub availability_domain: String,
    pub compartment_id: String,

    // Comportamiento
    /// Si es true el pipeline no crea la imagen. Útil para probar la fase
    /// de aprovisionamiento sin pagar la captura. Default false.
    pub skip_create_image: bool,
    /// Preferir la dirección privada de la instancia al resolver su IP.
    pub use_private_ip: bool,

    // Imagen
    pub base_image_id: Option<String>,
    pub base_image_filter: Option<BaseImageFilter>,
    /// Nombre de la imagen resultante; si falta se sintetiza
    /// `bakeflow-<timestamp>`.
    pub image_name: Option<String>,
    /// Compartimento destino de la imagen; default: `compartment_id`.
    pub image_compartment_id: Option<String>,
    pub launch_mode: Option<String>,
    pub nic_attachment_type: Option<String>,

    // Instancia
    pub instance_name: Option<String>,
    pub instance_tags: IndexMap<String, String>,
    /// Toggle opcional del endpoint legado de metadatos. Sin valor se
    /// reenvía sin valor: decide el default de la plataforma, no nosotros.
    pub instance_options_are_legacy_imds_endpoints_disabled: Option<bool>,
    pub shape: String,
    pub shape_config: FlexShapeConfig,
    pub boot_volume_size_in_gbs: Option<i64>,
    /// Pares clave/valor arbitrarios de metadata de la instancia. Puede
    /// traer `user_data`, pero los campos explícitos tienen precedencia.
    pub metadata: IndexMap<String, String>,

    /// `user_data` y `user_data_file` son opcionales y mutuamente
    /// excluyentes.
    pub user_data: Option<String>,
    pub user_data_file: Option<PathBuf>,

    // Red
    pub subnet_id: Option<String>,
    pub create_vnic_details: CreateVnicDetails,

    // Etiquetas de la imagen
    pub tags: IndexMap<String, String>,
}

impl BuildConfig {
    /// Valida y completa la configuración. Acumula todos los errores antes
    /// de reportar.
    pub fn prepare(&mut self) -> Result<(), ConfigError> {
        let mut errs: Vec<String> = Vec::new();

        // Región: config > entorno > fallback.
        if self.region.as_deref().map_or(true, str::is_empty) {
            self.region = Some(ENV.region.clone().unwrap_or_else(|| FALLBACK_REGION.to_string()));
        }

        if self.availability_domain.is_empty() {
            errs.push("'availability_domain' must be specified".to_string());
        }

        if self.compartment_id.is_empty() {
            errs.push("'compartment_id' must be specified".to_string());
        }

        if self.image_compartment_id.as_deref().map_or(true, str::is_empty) {
            self.image_compartment_id = Some(self.compartment_id.clone());
        }

        if self.shape.is_empty() {
            errs.push("'shape' must be specified".to_string());
        }

        if self.shape.ends_with("Flex") && self.shape_config.ocpus.is_none() {
            errs.push("'ocpus' must be specified when using flexible shapes".to_string());
        }

        if self.shape_config.memory_in_gbs.is_some() && self.shape_config.ocpus.is_none() {
            errs.push("'ocpus' must be specified if memory_in_gbs is specified".to_string());
        }

        if self.shape_config.baseline_ocpu_utilization.is_some() && self.shape_config.ocpus.is_none() {
            errs.push("'ocpus' must be specified if baseline_ocpu_utilization is specified".to_string());
        }

        // Subred: al menos una fuente, y ambas deben coincidir si hay dos.
        match (&self.subnet_id, &self.create_vnic_details.subnet_id) {
            (None, None) => errs.push("'subnet_id' must be specified".to_string()),
            (Some(subnet), None) => self.create_vnic_details.subnet_id = Some(subnet.clone()),
            (Some(subnet), Some(vnic_subnet)) if subnet != vnic_subnet => {
                errs.push("'create_vnic_details[subnet_id]' must match 'subnet_id' if both are specified".to_string());
            }
            _ => {}
        }

        // Imagen base: id explícito o filtro.
        if self.base_image_id.as_deref().map_or(true, str::is_empty) && self.base_image_filter.is_none() {
            errs.push("'base_image_id' or 'base_image_filter' must be specified".to_string());
        }
        if let Some(filter) = &mut self.base_image_filter {
            if filter.compartment_id.is_none() {
                filter.compartment_id = Some(self.compartment_id.clone());
            }
            if filter.shape.is_none() {
                filter.shape = Some(self.shape.clone());
            }
        }

        validate_tag_map(&self.tags, &mut errs);

        if self.image_name.as_deref().map_or(true, str::is_empty) {
            self.image_name = Some(format!("bakeflow-{}", Utc::now().format("%Y%m%d%H%M%S")));
        }

        // User data: fuente única, luego normalización a base64 canónico.
        if self.user_data.is_some() && self.user_data_file.is_some() {
            errs.push("only one of user_data or user_data_file can be specified".to_string());
        } else if let Some(path) = &self.user_data_file {
            match std::fs::read_to_string(path) {
                Ok(content) => self.user_data = Some(content),
                Err(e) => errs.push(format!("problem reading user_data_file {}: {e}", path.display())),
            }
        }
        if let Some(data) = &self.user_data {
            if BASE64.decode(data).is_err() {
                self.user_data = Some(BASE64.encode(data));
            }
        }

        if let Some(mode) = &self.launch_mode {
            if let Err(e) = mode.parse::<LaunchMode>() {
                errs.push(e.to_string());
            }
        }

        if let Some(nic) = &self.nic_attachment_type {
            if let Err(e) = nic.parse::<NicAttachmentType>() {
                errs.push(e.to_string());
            }
        }

        if let Some(size) = self.boot_volume_size_in_gbs {
            if !(50..=16384).contains(&size) {
                errs.push("'boot_volume_size_in_gbs' must be between 50 and 16384 GBs".to_string());
            }
        }

        if errs.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(errs))
        }
    }

    /// Región efectiva. Sólo es definitiva tras `prepare()`; antes devuelve
    /// el fallback.
    pub fn region(&self) -> &str {
        self.region.as_deref().unwrap_or(FALLBACK_REGION)
    }

    /// Compartimento destino de la imagen (rellenado por `prepare()`).
    pub fn image_compartment(&self) -> &str {
        self.image_compartment_id.as_deref().unwrap_or(&self.compartment_id)
    }

    /// Modo de lanzamiento ya validado, si fue configurado.
    pub fn launch_mode_parsed(&self) -> Option<LaunchMode> {
        self.launch_mode.as_deref().and_then(|m| m.parse().ok())
    }
}

/// Valida largos de clave y valor de un mapa de etiquetas.
fn validate_tag_map(tags: &IndexMap<String, String>, errs: &mut Vec<String>) {
    for (k, v) in tags {
        let k = k.trim();
        let v = v.trim();
        if k.is_empty() {
            errs.push("tag key empty in config".to_string());
        } else if k.len() > MAX_TAG_LEN {
            errs.push(format!("tag key length too long, maximum {MAX_TAG_LEN} but found {}: {k}", k.len()));
        }
        if v.is_empty() {
            errs.push(format!("tag value empty in config for key: {k}"));
        } else if v.len() > MAX_TAG_LEN {
            errs.push(format!("tag value length too long, maximum {MAX_TAG_LEN} but found {}: {k}", v.len()));
        }
    }
}
