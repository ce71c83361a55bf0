pub mod access;
pub mod analytics;
pub mod auth;
pub mod banners;
pub mod blog;
pub mod categories;
pub mod collections;
pub mod newsletter;
pub mod orders;
pub mod products;
pub mod reviews;

use actix_web::HttpResponse;
use leptos::logging::log;
use serde_json::json;

/// Signing secret shared by every handler, injected as app data.
#[derive(Clone)]
pub struct JwtSecret(pub Vec<u8>);

/// Logs the underlying error server-side and returns the generic 500
/// envelope. Raw database messages never reach the client.
pub(crate) fn server_error(context: &str, err: impl std::fmt::Debug) -> HttpResponse {
    log!("[API] {}: {:?}", context, err);
    HttpResponse::InternalServerError().json(json!({ "message": "Internal server error" }))
}
