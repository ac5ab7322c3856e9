//! Imagen personalizada capturada desde una instancia y sus enumeraciones
//! asociadas (ciclo de vida, modo de lanzamiento, tipo de NIC).
//!
//! El registro `Image` es el único dato que el pipeline publica hacia el
//! artefacto final; se construye con lo que devuelve el plano de control al
//! pedir la captura (posiblemente parcial: sólo el id) y se completa cuando
//! la espera confirma la transición a AVAILABLE.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::DomainError;

/// Estados que una imagen personalizada puede reportar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImageLifecycleState {
    Provisioning,
    Importing,
    Available,
    Exporting,
    Disabled,
    Deleted,
}

impl ImageLifecycleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageLifecycleState::Provisioning => "PROVISIONING",
            ImageLifecycleState::Importing => "IMPORTING",
            ImageLifecycleState::Available => "AVAILABLE",
            ImageLifecycleState::Exporting => "EXPORTING",
            ImageLifecycleState::Disabled => "DISABLED",
            ImageLifecycleState::Deleted => "DELETED",
        }
    }
}

impl fmt::Display for ImageLifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Modo con el que el hipervisor lanza instancias creadas desde la imagen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LaunchMode {
    Native,
    Emulated,
    Paravirtualized,
    Custom,
}

impl LaunchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            LaunchMode::Native => "NATIVE",
            LaunchMode::Emulated => "EMULATED",
            LaunchMode::Paravirtualized => "PARAVIRTUALIZED",
            LaunchMode::Custom => "CUSTOM",
        }
    }
}

impl fmt::Display for LaunchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LaunchMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "NATIVE" => Ok(LaunchMode::Native),
            "EMULATED" => Ok(LaunchMode::Emulated),
            "PARAVIRTUALIZED" => Ok(LaunchMode::Paravirtualized),
            "CUSTOM" => Ok(LaunchMode::Custom),
            other => Err(DomainError::ValidationError(format!("LaunchMode must be one of NATIVE, EMULATED, PARAVIRTUALIZED, or CUSTOM (got {other})"))),
        }
    }
}

/// Tipo de adjunto de red que las instancias lanzadas desde la imagen usarán.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NicAttachmentType {
    Vfio,
    E1000,
    Paravirtualized,
}

impl NicAttachmentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NicAttachmentType::Vfio => "VFIO",
            NicAttachmentType::E1000 => "E1000",
            NicAttachmentType::Paravirtualized => "PARAVIRTUALIZED",
        }
    }
}

impl fmt::Display for NicAttachmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NicAttachmentType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "VFIO" => Ok(NicAttachmentType::Vfio),
            "E1000" => Ok(NicAttachmentType::E1000),
            "PARAVIRTUALIZED" => Ok(NicAttachmentType::Paravirtualized),
            other => Err(DomainError::ValidationError(format!("NicAttachmentType must be one of VFIO, E1000, or PARAVIRTUALIZED (got {other})"))),
        }
    }
}

/// Imagen personalizada tal como la reporta el plano de control.
///
/// Los campos opcionales pueden venir vacíos en un handle provisional
/// (recién pedida la captura) y también en imágenes importadas que no
/// declaran sistema operativo. Los consumidores deben omitir, no fallar,
/// ante un campo ausente.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub id: String,
    pub compartment_id: Option<String>,
    pub display_name: Option<String>,
    pub base_image_id: Option<String>,
    pub launch_mode: Option<LaunchMode>,
    pub operating_system: Option<String>,
    pub operating_system_version: Option<String>,
    pub billable_size_in_gbs: Option<i64>,
    pub lifecycle_state: ImageLifecycleState,
    pub time_created: Option<DateTime<Utc>>,
}

impl Image {
    /// Handle provisional: sólo el id es conocido, el resto llegará cuando
    /// el plano de control termine de materializar la imagen.
    pub fn provisional(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(DomainError::ValidationError("image id cannot be empty".to_string()));
        }
        Ok(Image { id,
                   compartment_id: None,
                   display_name: None,
                   base_image_id: None,
                   launch_mode: None,
                   operating_system: None,
                   operating_system_version: None,
                   billable_size_in_gbs: None,
                   lifecycle_state: ImageLifecycleState::Provisioning,
                   time_created: None })
    }

    /// Indica si la imagen ya puede usarse para lanzar instancias.
    pub fn is_available(&self) -> bool {
        self.lifecycle_state == ImageLifecycleState::Available
    }
}

impl fmt::Display for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.display_name.as_deref().unwrap_or("<unnamed>");
        write!(f, "<image: {} ({})>", name, self.id)
    }
}
