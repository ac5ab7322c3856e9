//! Step de lanzamiento de la instancia temporal.
use std::sync::Arc;

use async_trait::async_trait;
use bake_core::{cancel, BuildError, BuildStep, StepAction, StepContext};
use bake_domain::InstanceLifecycleState;

use crate::state::BuildState;

/// Crea la instancia de cómputo y espera a que corra. Su limpieza termina
/// la instancia sin importar cómo haya muerto el build.
pub struct LaunchInstanceStep;

#[async_trait]
impl BuildStep<BuildState> for LaunchInstanceStep {
    fn id(&self) -> &str {
        "launch_instance"
    }

    async fn run(&mut self, ctx: &StepContext, state: &mut BuildState) -> StepAction {
        // 1. Precondición de orden: la fase externa de claves corre antes.
        //    Que falte es un bug de armado del pipeline, no un error del
        //    usuario.
        debug_assert!(state.public_key.is_some(), "public_key must be seeded before the launch step");
        let Some(public_key) = state.public_key.clone() else {
            return StepAction::halt(BuildError::Precondition("public_key not present in build state".to_string()));
        };
        let driver = Arc::clone(&state.driver);

        ctx.say("Creating instance...");

        // 2. Crear y publicar el id de inmediato: la limpieza debe poder
        //    terminar una instancia a medio crear aunque la espera que
        //    sigue fracase.
        let instance_id = match driver.create_instance(ctx.cancel_signal(), &public_key).await {
            Ok(id) => id,
            Err(err) => {
                ctx.error(format!("Problem creating instance: {err}"));
                return StepAction::halt(err);
            }
        };
        state.instance_id = Some(instance_id.clone());
        ctx.say(format!("Created instance ({instance_id})."));

        // 3. Esperar RUNNING; llegar a TERMINATED en el camino es falla.
        ctx.say("Waiting for instance to enter 'RUNNING' state...");
        if let Err(err) = driver.wait_for_instance_state(ctx.cancel_signal(),
                                                         &instance_id,
                                                         &[InstanceLifecycleState::Running],
                                                         InstanceLifecycleState::Terminated)
                                .await
        {
            ctx.error(format!("Error waiting for instance to start: {err}"));
            return StepAction::halt(err);
        }

        ctx.say("Instance is running.");
        StepAction::Continue
    }

    async fn cleanup(&mut self, ctx: &StepContext, state: &mut BuildState) -> Result<(), BuildError> {
        // Sin id no hay nada que terminar (la creación misma falló).
        let Some(instance_id) = state.instance_id.clone() else {
            return Ok(());
        };
        let driver = Arc::clone(&state.driver);
        // Señal que nunca dispara: un build cancelado igual desmantela.
        let cancel = cancel::never();

        ctx.say(format!("Terminating instance ({instance_id})..."));
        driver.terminate_instance(&cancel, &instance_id).await?;
        driver.wait_for_instance_state(&cancel,
                                       &instance_id,
                                       &[InstanceLifecycleState::Terminated],
                                       InstanceLifecycleState::Terminated)
              .await?;
        ctx.say("Terminated instance.");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::mock::MOCK_INSTANCE_ID;
    use crate::steps::testing::{test_config, test_state};

    #[tokio::test]
    async fn test_launch_instance() {
        let (mut state, driver, ctx, _sink) = test_state(test_config());
        state.public_key = Some("key".to_string());
        let mut step = LaunchInstanceStep;

        let action = step.run(&ctx, &mut state).await;
        assert!(action.is_continue(), "bad action: {action:?}");
        assert_eq!(state.instance_id.as_deref(), Some(MOCK_INSTANCE_ID));

        step.cleanup(&ctx, &mut state).await.unwrap();
        assert_eq!(driver.terminate_instance_id().as_deref(), Some(MOCK_INSTANCE_ID));
    }

    #[tokio::test]
    async fn test_launch_instance_options_passthrough() {
        // El toggle opcional debe llegar al pedido de creación tal cual:
        // Some(true), Some(false) o sin valor.
        for value in [Some(true), Some(false), None] {
            let mut config = test_config();
            config.instance_options_are_legacy_imds_endpoints_disabled = value;
            let (mut state, driver, ctx, _sink) = test_state(config);
            state.public_key = Some("key".to_string());
            let mut step = LaunchInstanceStep;

            let action = step.run(&ctx, &mut state).await;
            assert!(action.is_continue(), "bad action: {action:?}");
            assert_eq!(driver.captured_legacy_imds_endpoints_disabled(), value);
        }
    }

    #[tokio::test]
    async fn test_launch_instance_create_err() {
        let (mut state, driver, ctx, _sink) = test_state(test_config());
        state.public_key = Some("key".to_string());
        driver.fail_create_instance(BuildError::ControlPlane("quota exceeded".to_string()));
        let mut step = LaunchInstanceStep;

        let action = step.run(&ctx, &mut state).await;
        assert_eq!(action.error(), Some(&BuildError::ControlPlane("quota exceeded".to_string())));
        assert_eq!(state.instance_id, None);

        // Sin instance_id la limpieza no debe intentar terminar nada.
        step.cleanup(&ctx, &mut state).await.unwrap();
        assert_eq!(driver.terminate_instance_id(), None);
    }

    #[tokio::test]
    async fn test_launch_instance_wait_err_keeps_instance_id() {
        let (mut state, driver, ctx, _sink) = test_state(test_config());
        state.public_key = Some("key".to_string());
        driver.fail_wait_for_instance_state(BuildError::WaitTimeout(1800));
        let mut step = LaunchInstanceStep;

        let action = step.run(&ctx, &mut state).await;
        assert_eq!(action.error(), Some(&BuildError::WaitTimeout(1800)));
        // El id queda publicado para que la limpieza pueda terminar la
        // instancia a medio crear.
        assert_eq!(state.instance_id.as_deref(), Some(MOCK_INSTANCE_ID));

        let _ = step.cleanup(&ctx, &mut state).await;
        assert_eq!(driver.terminate_instance_id().as_deref(), Some(MOCK_INSTANCE_ID));
    }

    #[tokio::test]
    async fn test_launch_cleanup_terminate_err_is_returned() {
        let (mut state, driver, ctx, _sink) = test_state(test_config());
        state.public_key = Some("key".to_string());
        let mut step = LaunchInstanceStep;

        assert!(step.run(&ctx, &mut state).await.is_continue());

        driver.fail_terminate_instance(BuildError::ControlPlane("conflict".to_string()));
        let err = step.cleanup(&ctx, &mut state).await.unwrap_err();
        assert_eq!(err, BuildError::ControlPlane("conflict".to_string()));
    }

    #[tokio::test]
    async fn test_launch_cleanup_wait_err_is_returned() {
        let (mut state, driver, ctx, _sink) = test_state(test_config());
        state.public_key = Some("key".to_string());
        let mut step = LaunchInstanceStep;

        assert!(step.run(&ctx, &mut state).await.is_continue());

        driver.fail_wait_for_instance_state(BuildError::WaitTimeout(1800));
        let err = step.cleanup(&ctx, &mut state).await.unwrap_err();
        assert_eq!(err, BuildError::WaitTimeout(1800));
        // El pedido de terminación sí salió antes de la espera fallida.
        assert_eq!(driver.terminate_instance_id().as_deref(), Some(MOCK_INSTANCE_ID));
    }

    #[tokio::test]
    #[should_panic(expected = "public_key must be seeded")]
    async fn test_launch_without_public_key_fails_loudly() {
        let (mut state, _driver, ctx, _sink) = test_state(test_config());
        let mut step = LaunchInstanceStep;
        let _ = step.run(&ctx, &mut state).await;
    }
}
