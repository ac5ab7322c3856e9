//! Frontera de capacidades contra el plano de control de cómputo.
//!
//! Cada operación es una llamada de red que puede fallar, bloquearse o
//! necesitar cancelación; todas reciben la señal del build. Las esperas
//! (`wait_for_*`) vienen provistas por el propio trait como lazos de polling
//! sobre las sondas `read_*_state`, de modo que una implementación real sólo
//! aporta las llamadas puntuales y hereda la semántica de intervalo, tope y
//! cancelación; el driver simulado las sobreescribe para guionar fallas.
use async_trait::async_trait;
use bake_core::{poll_until, BuildError, CancelSignal, PollConfig, PollState};
use bake_domain::{Image, ImageLifecycleState, InstanceLifecycleState};

pub mod mock;

pub use mock::MockDriver;

#[async_trait]
pub trait Driver: Send + Sync {
    /// Aprovisiona una instancia de cómputo y devuelve su id. Falla ante
    /// cuota, autenticación o una especificación malformada.
    async fn create_instance(&self, cancel: &CancelSignal, public_key: &str) -> Result<String, BuildError>;

    /// Resuelve la dirección pública o privada de la instancia según la
    /// configuración. Falla si la instancia aún no tiene dirección; esperar
    /// primero es responsabilidad del caller.
    async fn get_instance_ip(&self, cancel: &CancelSignal, instance_id: &str) -> Result<String, BuildError>;

    /// Sonda puntual del estado de la instancia.
    async fn read_instance_state(&self, cancel: &CancelSignal, instance_id: &str) -> Result<InstanceLifecycleState, BuildError>;

    /// Sonda puntual del estado de la imagen.
    async fn read_image_state(&self, cancel: &CancelSignal, image_id: &str) -> Result<ImageLifecycleState, BuildError>;

    /// Pedido idempotente de destrucción de la instancia (mejor esfuerzo).
    async fn terminate_instance(&self, cancel: &CancelSignal, instance_id: &str) -> Result<(), BuildError>;

    /// Pide la captura de una imagen desde una instancia corriendo. El
    /// handle devuelto puede ser provisional (sólo id): la imagen todavía
    /// no es usable.
    async fn create_image(&self, cancel: &CancelSignal, instance_id: &str) -> Result<Image, BuildError>;

    /// Finaliza la metadata de capacidades de la imagen. Parte de la
    /// creación, no un extra opcional.
    async fn update_image_capability_schema(&self, cancel: &CancelSignal, image_id: &str) -> Result<(), BuildError>;

    /// Borra la imagen. La usa sólo la destrucción del artefacto, nunca el
    /// pipeline.
    async fn delete_image(&self, cancel: &CancelSignal, image_id: &str) -> Result<(), BuildError>;

    /// Parámetros del lazo de espera de esta implementación.
    fn poll_config(&self) -> PollConfig {
        PollConfig::default()
    }

    /// Sondea hasta que la instancia reporte un estado de `wait_states`;
    /// llegar a `terminal_state` antes es falla (los estados aceptables
    /// ganan si coinciden).
    async fn wait_for_instance_state(&self,
                                     cancel: &CancelSignal,
                                     instance_id: &str,
                                     wait_states: &[InstanceLifecycleState],
                                     terminal_state: InstanceLifecycleState)
                                     -> Result<(), BuildError> {
        let config = self.poll_config();
        poll_until(&config, cancel, || async move {
            let current = self.read_instance_state(cancel, instance_id).await?;
            if wait_states.contains(&current) {
                return Ok(PollState::Ready(()));
            }
            if current == terminal_state {
                return Ok(PollState::Terminal(current.to_string()));
            }
            Ok(PollState::Pending)
        }).await
    }

    /// Sondea hasta que la imagen esté AVAILABLE; DELETED es terminal.
    async fn wait_for_image_creation(&self, cancel: &CancelSignal, image_id: &str) -> Result<(), BuildError> {
        let config = self.poll_config();
        poll_until(&config, cancel, || async move {
            match self.read_image_state(cancel, image_id).await? {
                ImageLifecycleState::Available => Ok(PollState::Ready(())),
                ImageLifecycleState::Deleted => {
                    Ok(PollState::Terminal(ImageLifecycleState::Deleted.to_string()))
                }
                _ => Ok(PollState::Pending),
            }
        }).await
    }
}
