//! services/bot/src/bin/openapi.rs
//!
//! Generates the OpenAPI 3.0 specification for the REST API and writes it to
//! the path given as the first argument (default `openapi.json`).

use bot_lib::web::rest::ApiDoc;
use utoipa::OpenApi;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "openapi.json".to_string());
    let spec_json = ApiDoc::openapi().to_pretty_json()?;
    std::fs::write(&path, spec_json)?;
    println!("✅ OpenAPI specification generated at {}", path);
    Ok(())
}
