use std::env;

use studiogen::{GenerationRequest, StudioClient, StudioConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    match dotenv::dotenv() {
        Ok(_) => log::info!("✅ .env file loaded"),
        Err(_) => log::warn!("⚠️  No .env file found"),
    }
    studiogen::logger::init()?;

    let endpoint = env::var("STUDIO_WEBHOOK_URL")?;
    let client = StudioClient::new(StudioConfig::from_env())?;

    let request = GenerationRequest {
        topic: "Local election night".to_string(),
        headline_line1: "THE COUNT".to_string(),
        headline_line2: "IS ON".to_string(),
        subline: "First projections at 8pm".to_string(),
        background_info: "city hall at dusk, rain-wet street".to_string(),
        important: "sober tone, no party colors".to_string(),
        generation_count: 2,
        endpoint_url: endpoint,
        ..Default::default()
    };

    client.generate(request).await?;

    let snapshot = client.engine().snapshot();
    println!("phase: {:?}", snapshot.phase);
    for (idx, image) in snapshot.results.iter().enumerate() {
        println!("variant {}: {} bytes encoded", idx + 1, image.len());
    }

    Ok(())
}
