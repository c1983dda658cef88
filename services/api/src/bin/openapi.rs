//! services/api/src/bin/openapi.rs
//!
//! This binary renders the OpenAPI 3.0 document for the session bootstrap API
//! and saves it to a file named `openapi.json`.

use api_lib::web::rest::ApiDoc;
use utoipa::OpenApi;

/// Renders the OpenAPI document and writes it to `path`.
fn generate_document(
    api_doc: utoipa::openapi::OpenApi,
    path: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let document = api_doc.to_pretty_json()?;
    std::fs::write(path, document)?;
    println!("OpenAPI document for the wellness plan API written to {}", path);
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Render the shared ApiDoc and save it to `openapi.json`.
    generate_document(ApiDoc::openapi(), "openapi.json")?;
    Ok(())
}
