pub mod accounts;
pub mod content;
pub mod health;
pub mod keywords;
pub mod optimize;
pub mod reports;
pub mod settings;
pub mod verify;
pub mod workflows;

use actix_web::HttpResponse;

/// Uniform 500 for storage failures; the message is already user-readable.
pub(crate) fn storage_error(e: String) -> HttpResponse {
    log::error!("Storage error: {}", e);
    HttpResponse::InternalServerError().json(serde_json::json!({ "error": e }))
}

/// Brand from the request if given, otherwise the configured default.
/// Errors when neither is available.
pub(crate) fn resolve_brand(
    state: &actix_web::web::Data<crate::AppState>,
    requested: Option<&str>,
) -> Result<String, HttpResponse> {
    if let Some(brand) = requested {
        if !brand.trim().is_empty() {
            return Ok(brand.trim().to_string());
        }
    }
    match state.storage.get_app_settings() {
        Ok(settings) if !settings.brand.trim().is_empty() => Ok(settings.brand),
        Ok(_) => Err(HttpResponse::BadRequest().json(serde_json::json!({
            "error": "No brand given and no default brand configured"
        }))),
        Err(e) => Err(storage_error(e)),
    }
}
