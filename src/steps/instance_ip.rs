//! Step de resolución de la dirección de la instancia.
use std::sync::Arc;

use async_trait::async_trait;
use bake_core::{BuildError, BuildStep, StepAction, StepContext};

use crate::state::BuildState;

/// Resuelve la dirección (pública o privada según configuración) de la
/// instancia ya corriendo y la publica para la fase de aprovisionamiento.
pub struct InstanceIpStep;

#[async_trait]
impl BuildStep<BuildState> for InstanceIpStep {
    fn id(&self) -> &str {
        "instance_ip"
    }

    async fn run(&mut self, ctx: &StepContext, state: &mut BuildState) -> StepAction {
        debug_assert!(state.instance_id.is_some(), "instance_id must be set before the IP step");
        let Some(instance_id) = state.instance_id.clone() else {
            return StepAction::halt(BuildError::Precondition("instance_id not present in build state".to_string()));
        };
        let driver = Arc::clone(&state.driver);

        let ip = match driver.get_instance_ip(ctx.cancel_signal(), &instance_id).await {
            Ok(ip) => ip,
            Err(err) => {
                ctx.error(format!("Error getting instance's IP address: {err}"));
                return StepAction::halt(err);
            }
        };

        ctx.say(format!("Instance has IP: {ip}."));
        state.instance_ip = Some(ip);
        StepAction::Continue
    }
}
