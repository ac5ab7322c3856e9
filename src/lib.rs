//! Bakeflow Rust Library
//!
//! Este crate actúa como la librería central de Bakeflow:
//! - Expone `config` (configuración validada del build) y `driver` (la
//!   frontera contra el plano de control, con su mock).
//! - Expone los steps del pipeline, el estado tipado y la fachada
//!   `ImageBuilder` que los orquesta sobre `bake-core`.
//! - Expone `artifact` para el resultado inmutable del build.
//!
//! Puede usarse desde `main.rs` o por otros crates/clientes.

pub mod artifact;
pub mod builder;
pub mod config;
pub mod driver;
pub mod state;
pub mod steps;

pub use artifact::{Artifact, RegistryImageMetadata, ARTIFACT_STATE_REGISTRY_METADATA, BUILDER_ID};
pub use builder::ImageBuilder;
pub use config::{BaseImageFilter, BuildConfig, ConfigError, CreateVnicDetails, FlexShapeConfig};
pub use driver::{Driver, MockDriver};
pub use state::BuildState;
pub use steps::{ImageStep, InstanceIpStep, LaunchInstanceStep};
