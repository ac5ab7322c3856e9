//! Step de captura de la imagen personalizada.
use std::sync::Arc;

use async_trait::async_trait;
use bake_core::{BuildError, BuildStep, StepAction, StepContext};
use bake_domain::ImageLifecycleState;

use crate::state::BuildState;

/// Captura una imagen desde la instancia, espera a que esté disponible y
/// finaliza su esquema de capacidades. El handle se publica recién cuando
/// las tres operaciones terminaron: `image` presente implica éxito total.
///
/// La limpieza es no-op: borrar la imagen es una operación del artefacto
/// (decisión explícita del caller), nunca del pipeline. Una imagen a medio
/// crear que quedó del lado del servidor es responsabilidad del operador.
pub struct ImageStep {
    pub skip_create_image: bool,
}

#[async_trait]
impl BuildStep<BuildState> for ImageStep {
    fn id(&self) -> &str {
        "image"
    }

    async fn run(&mut self, ctx: &StepContext, state: &mut BuildState) -> StepAction {
        debug_assert!(state.instance_id.is_some(), "instance_id must be set before the image step");
        let Some(instance_id) = state.instance_id.clone() else {
            return StepAction::halt(BuildError::Precondition("instance_id not present in build state".to_string()));
        };
        let driver = Arc::clone(&state.driver);

        if self.skip_create_image {
            ctx.say("Skipping image creation...");
            return StepAction::Continue;
        }

        ctx.say("Creating image from instance...");
        let mut image = match driver.create_image(ctx.cancel_signal(), &instance_id).await {
            Ok(image) => image,
            Err(err) => {
                ctx.error(format!("Error creating image from instance: {err}"));
                return StepAction::halt(err);
            }
        };

        if let Err(err) = driver.wait_for_image_creation(ctx.cancel_signal(), &image.id).await {
            ctx.error(format!("Error waiting for image creation to finish: {err}"));
            return StepAction::halt(err);
        }

        ctx.say("Updating image capability schema...");
        if let Err(err) = driver.update_image_capability_schema(ctx.cancel_signal(), &image.id).await {
            ctx.error(format!("Error updating image schema: {err}"));
            return StepAction::halt(err);
        }

        // La espera observó la transición: el handle publicado ya no es
        // provisional.
        image.lifecycle_state = ImageLifecycleState::Available;
        ctx.say(format!("Created image ({}).", image.id));
        state.image = Some(image);

        StepAction::Continue
    }
}
