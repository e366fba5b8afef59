use std::env;

use studiogen::storage::Collection;
use studiogen::{GenerationRequest, Phase, StudioClient, StudioConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file first
    match dotenv::dotenv() {
        Ok(_) => log::info!("✅ .env file loaded successfully"),
        Err(_) => log::warn!("⚠️  No .env file found, using system environment variables"),
    }

    studiogen::logger::init_with_config(
        studiogen::logger::LoggerConfig::development()
            .with_level(studiogen::logger::LogLevel::Debug),
    )?;

    log::info!("🔍 Checking studio environment...");

    if let Ok(backend) = env::var("STUDIO_BACKEND_URL") {
        log::info!("STUDIO_BACKEND_URL: {}", backend);
    } else {
        log::warn!("No backend URL set, using http://127.0.0.1:3006");
    }

    match env::var("STUDIO_WEBHOOK_URL") {
        Ok(url) => log::info!("✅ Webhook endpoint configured: {}", url),
        Err(_) => {
            log::warn!("⚠️  STUDIO_WEBHOOK_URL not set, falling back to the primary preset");
            log::warn!("💡 Generation will fail unless the preset points at a live workflow");
        }
    }

    log::info!("🔄 Creating studio client...");
    let client = match StudioClient::new(StudioConfig::from_env()) {
        Ok(client) => {
            log::info!("✅ Studio client initialized successfully");
            client
        }
        Err(e) => {
            log::error!("❌ Failed to initialize studio client: {}", e);
            return Err(e.into());
        }
    };

    log::info!("🗂️  Overlay presets:");
    for setting in &client.settings().overlays {
        log::info!("  {} - {}", setting.name, setting.url);
    }

    // Test 1: gallery loads
    log::info!("🖼️  Loading galleries...");
    let library = client.storage().load_or_empty(Collection::Library).await;
    let archive = client.storage().load_or_empty(Collection::Archive).await;
    log::info!("📚 Library: {} image(s)", library.len());
    log::info!("🗄️  Archive: {} image(s)", archive.len());

    // Test 2: a full generation round trip
    log::info!("🎨 Testing image generation...");

    let request = GenerationRequest {
        topic: env::var("STUDIO_TOPIC").unwrap_or_else(|_| "Morning traffic report".to_string()),
        headline_line1: "GRIDLOCK".to_string(),
        subline: "Why the ring road is full again".to_string(),
        background_info: "aerial highway shot, golden hour".to_string(),
        important: "clean typography, no logos".to_string(),
        generation_count: 1,
        ..Default::default()
    };

    match client.generate(request).await {
        Ok(()) => {
            let snapshot = client.engine().snapshot();
            log::info!("✅ Generation finished in phase {:?}", snapshot.phase);
            log::info!("🖼️  Produced {} variant(s)", snapshot.results.len());
        }
        Err(e) => {
            log::error!("❌ Generation failed: {}", e);
            log::warn!("💡 Check the webhook URL and that the workflow responds with an image");
        }
    }

    // Test 3: regenerate the newest archived variant, if any
    let archive = client.storage().load_or_empty(Collection::Archive).await;
    if let Some(metadata) = archive.first().and_then(|image| image.metadata.clone()) {
        log::info!("🔁 Regenerating newest archived variant...");
        client.engine().reset();
        match client.regenerate(&metadata).await {
            Ok(()) => log::info!("✅ Regeneration complete"),
            Err(e) => log::error!("❌ Regeneration failed: {}", e),
        }
    } else {
        log::info!("🗄️  No archived metadata to regenerate");
    }

    let snapshot = client.engine().snapshot();
    if snapshot.phase == Phase::Error {
        if let Some(error) = snapshot.error {
            log::error!("Last error: {}", error);
        }
    }

    log::info!("🎉 Smoke run completed!");
    Ok(())
}
