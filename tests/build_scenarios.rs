//! Escenarios de punta a punta del pipeline a través de `ImageBuilder`,
//! contra el driver simulado.
use std::sync::Arc;

use bake_core::{cancellation, never, BuildError, EventSink, InMemoryEventSink};
use bakeflow_rust::{BuildConfig, Driver, ImageBuilder, MockDriver, ARTIFACT_STATE_REGISTRY_METADATA};
use uuid::Uuid;

fn prepared_config() -> BuildConfig {
    let mut config = BuildConfig { availability_domain: "Uocm:PHX-AD-1".to_string(),
                                   compartment_id: "ocid1.compartment.oc1..aaaa".to_string(),
                                   shape: "VM.Standard2.1".to_string(),
                                   subnet_id: Some("ocid1.subnet.oc1..bbbb".to_string()),
                                   base_image_id: Some("ocid1.image.oc1..cccc".to_string()),
                                   image_name: Some("scenario-image".to_string()),
                                   ..Default::default() };
    config.prepare().expect("config should prepare");
    config
}

struct Harness {
    builder: ImageBuilder,
    driver: Arc<MockDriver>,
    sink: Arc<InMemoryEventSink>,
    build_id: Uuid,
}

fn harness(config: BuildConfig) -> Harness {
    let config = Arc::new(config);
    let driver = Arc::new(MockDriver::with_config(Arc::clone(&config)));
    let sink = Arc::new(InMemoryEventSink::new());
    let builder = ImageBuilder::new(config,
                                    Arc::clone(&driver) as Arc<dyn Driver>,
                                    Arc::clone(&sink) as Arc<dyn EventSink>);
    Harness { builder,
              driver,
              sink,
              build_id: Uuid::new_v4() }
}

#[tokio::test]
async fn test_successful_build_produces_artifact_and_tears_down() {
    let h = harness(prepared_config());

    let artifact = h.builder
                    .run(h.build_id, "ssh-ed25519 AAAA...", never())
                    .await
                    .unwrap()
                    .expect("should have artifact");

    assert_eq!(artifact.id(), "ocid1.image.oc1..mock");
    assert!(artifact.to_string().contains("'scenario-image'"));
    assert!(artifact.state(ARTIFACT_STATE_REGISTRY_METADATA).is_some());

    // La instancia temporal se terminó en la limpieza aun con éxito total.
    assert_eq!(h.driver.terminate_instance_id().as_deref(), Some("ocid1..."));
    let messages = h.sink.messages(h.build_id);
    assert!(messages.iter().any(|m| m.contains("Created image")), "messages: {messages:?}");
    assert!(messages.iter().any(|m| m.contains("Terminated instance")));
}

#[tokio::test]
async fn test_create_instance_failure_halts_without_teardown() {
    let h = harness(prepared_config());
    h.driver.fail_create_instance(BuildError::ControlPlane("quota exceeded".to_string()));

    let err = h.builder
               .run(h.build_id, "ssh-ed25519 AAAA...", never())
               .await
               .unwrap_err();

    assert_eq!(err, BuildError::ControlPlane("quota exceeded".to_string()));
    // Nunca hubo instancia: la limpieza no debe intentar terminar nada.
    assert_eq!(h.driver.terminate_instance_id(), None);
    assert!(!h.sink.errors(h.build_id).is_empty());
}

#[tokio::test]
async fn test_image_wait_failure_still_terminates_instance() {
    let h = harness(prepared_config());
    h.driver.fail_wait_for_image_creation(BuildError::WaitTimeout(1800));

    let err = h.builder
               .run(h.build_id, "ssh-ed25519 AAAA...", never())
               .await
               .unwrap_err();

    assert_eq!(err, BuildError::WaitTimeout(1800));
    // El drenado de limpieza corrió igual y terminó la instancia.
    assert_eq!(h.driver.terminate_instance_id().as_deref(), Some("ocid1..."));
}

#[tokio::test]
async fn test_skip_create_image_yields_no_artifact() {
    let mut config = prepared_config();
    config.skip_create_image = true;
    let h = harness(config);

    let artifact = h.builder
                    .run(h.build_id, "ssh-ed25519 AAAA...", never())
                    .await
                    .unwrap();

    assert!(artifact.is_none());
    assert_eq!(h.driver.create_image_id(), None);
    let messages = h.sink.messages(h.build_id);
    assert!(messages.iter().any(|m| m.contains("Skipping image creation")));
    assert!(messages.iter().any(|m| m.contains("produced no image")));
}

#[tokio::test]
async fn test_cancelled_before_start_runs_no_steps() {
    let h = harness(prepared_config());
    let (tx, rx) = cancellation();
    tx.send(true).unwrap();

    let err = h.builder
               .run(h.build_id, "ssh-ed25519 AAAA...", rx)
               .await
               .unwrap_err();

    assert_eq!(err, BuildError::Cancelled);
    assert_eq!(h.driver.create_instance_id(), None);
    assert_eq!(h.driver.terminate_instance_id(), None);
}

#[tokio::test]
async fn test_destroying_the_artifact_deletes_the_image() {
    let h = harness(prepared_config());

    let artifact = h.builder
                    .run(h.build_id, "ssh-ed25519 AAAA...", never())
                    .await
                    .unwrap()
                    .expect("should have artifact");

    artifact.destroy().await.unwrap();
    assert_eq!(h.driver.delete_image_id().as_deref(), Some("ocid1.image.oc1..mock"));
}

#[tokio::test]
async fn test_concurrent_builds_do_not_share_state() {
    // Dos builds con su propio driver y estado; comparten sólo el sink.
    let sink = Arc::new(InMemoryEventSink::new());
    let mut ids = Vec::new();

    let mut handles = Vec::new();
    for _ in 0..2 {
        let config = Arc::new(prepared_config());
        let driver = Arc::new(MockDriver::with_config(Arc::clone(&config)));
        let builder = ImageBuilder::new(config,
                                        driver as Arc<dyn Driver>,
                                        Arc::clone(&sink) as Arc<dyn EventSink>);
        let build_id = Uuid::new_v4();
        ids.push(build_id);
        handles.push(tokio::spawn(async move {
            builder.run(build_id, "ssh-ed25519 AAAA...", never()).await
        }));
    }

    for handle in handles {
        let artifact = handle.await.unwrap().unwrap();
        assert!(artifact.is_some());
    }
    for id in ids {
        assert!(!sink.messages(id).is_empty());
    }
}
