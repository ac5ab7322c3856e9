//! Binario demo: corre el pipeline de horneado completo contra el driver
//! simulado y muestra el registro de eventos resultante. Sirve para validar
//! a mano la secuencia lanzamiento → IP → imagen → limpieza sin tocar un
//! plano de control real.
use std::sync::Arc;

use bake_core::{cancellation, EventSink, InMemoryEventSink};
use bakeflow_rust::{BuildConfig, Driver, ImageBuilder, MockDriver, ARTIFACT_STATE_REGISTRY_METADATA};
use uuid::Uuid;

#[tokio::main]
async fn main() {
    // Variables de entorno desde .env si existe (región, modo de lanzamiento).
    dotenvy::dotenv().ok();

    let mut config = BuildConfig { availability_domain: "Uocm:PHX-AD-1".to_string(),
                                   compartment_id: "ocid1.compartment.oc1..demo".to_string(),
                                   shape: "VM.Standard2.1".to_string(),
                                   subnet_id: Some("ocid1.subnet.oc1..demo".to_string()),
                                   base_image_id: Some("ocid1.image.oc1..base".to_string()),
                                   launch_mode: std::env::var("BAKEFLOW_LAUNCH_MODE").ok(),
                                   skip_create_image: std::env::var("BAKEFLOW_SKIP_IMAGE").is_ok(),
                                   ..Default::default() };

    if let Err(err) = config.prepare() {
        eprintln!("configuration rejected: {err}");
        std::process::exit(1);
    }

    let config = Arc::new(config);
    let driver = Arc::new(MockDriver::with_config(Arc::clone(&config)));
    let sink = Arc::new(InMemoryEventSink::new());
    let builder = ImageBuilder::new(Arc::clone(&config),
                                    driver as Arc<dyn Driver>,
                                    Arc::clone(&sink) as Arc<dyn EventSink>);

    let build_id = Uuid::new_v4();
    let (_cancel_tx, cancel_rx) = cancellation();

    println!("== bakeflow demo (region {}) ==", config.region());
    match builder.run(build_id, "ssh-ed25519 AAAA...demo", cancel_rx).await {
        Ok(Some(artifact)) => {
            println!("{artifact}");
            if let Some(meta) = artifact.state(ARTIFACT_STATE_REGISTRY_METADATA) {
                println!("registry metadata: {meta}");
            }
        }
        Ok(None) => println!("Build finished without an image."),
        Err(err) => println!("Build failed: {err}"),
    }

    println!("-- events --");
    for event in sink.list(build_id) {
        println!("[{:>3}] {:?}", event.seq, event.kind);
    }
}
