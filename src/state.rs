//! Estado tipado del build.
//!
//! Reemplaza la bolsa dinámica clave/valor por un struct explícito que viaja
//! por referencia mutable a través del pipeline, conservando la regla de
//! propiedad: cada campo tiene exactamente un step escritor y los lectores
//! tratan `None` como "todavía no disponible", nunca como error.
//!
//! | campo         | escritor                    | lectores                       |
//! |---------------|-----------------------------|--------------------------------|
//! | `driver`      | el caller, al iniciar       | todos los steps                |
//! | `config`      | el caller, al iniciar       | todos los steps                |
//! | `public_key`  | fase externa de claves      | step de lanzamiento            |
//! | `instance_id` | step de lanzamiento         | steps de IP e imagen, limpieza |
//! | `instance_ip` | step de IP                  | fase externa de provisión      |
//! | `image`       | step de imagen              | construcción del artefacto     |
use std::sync::Arc;

use bake_domain::Image;

use crate::config::BuildConfig;
use crate::driver::Driver;

pub struct BuildState {
    pub driver: Arc<dyn Driver>,
    pub config: Arc<BuildConfig>,
    pub public_key: Option<String>,
    pub instance_id: Option<String>,
    pub instance_ip: Option<String>,
    pub image: Option<Image>,
}

impl BuildState {
    /// Estado inicial de una corrida: sólo driver y configuración.
    pub fn new(driver: Arc<dyn Driver>, config: Arc<BuildConfig>) -> Self {
        Self { driver,
               config,
               public_key: None,
               instance_id: None,
               instance_ip: None,
               image: None }
    }

    /// Siembra la clave pública que la fase externa de claves generó.
    pub fn with_public_key(mut self, public_key: impl Into<String>) -> Self {
        self.public_key = Some(public_key.into());
        self
    }
}
