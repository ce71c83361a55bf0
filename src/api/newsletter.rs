use super::{server_error, JwtSecret};
use crate::auth::authenticate_admin;
use crate::db::Database;
use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Serialize, Deserialize)]
pub struct SubscribeRequest {
    pub email: String,
}

pub async fn subscribe(
    db: web::Data<Database>,
    request: web::Json<SubscribeRequest>,
) -> HttpResponse {
    let email = request.email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return HttpResponse::BadRequest().json(json!({ "message": "A valid email is required" }));
    }
    match db.subscribe_email(&email).await {
        Ok(subscriber) => HttpResponse::Ok().json(json!({
            "message": "Subscribed",
            "subscriber": subscriber,
        })),
        Err(e) => server_error("subscribe", e),
    }
}

pub async fn list_subscribers(
    req: HttpRequest,
    db: web::Data<Database>,
    secret: web::Data<JwtSecret>,
) -> HttpResponse {
    if let Err(e) = authenticate_admin(&req, &secret.0) {
        return e.error_response();
    }
    match db.list_subscribers().await {
        Ok(subscribers) => HttpResponse::Ok().json(subscribers),
        Err(e) => server_error("list_subscribers", e),
    }
}

pub async fn unsubscribe(
    req: HttpRequest,
    db: web::Data<Database>,
    secret: web::Data<JwtSecret>,
    id: web::Path<i64>,
) -> HttpResponse {
    if let Err(e) = authenticate_admin(&req, &secret.0) {
        return e.error_response();
    }
    match db.unsubscribe_email(id.into_inner()).await {
        Ok(true) => HttpResponse::Ok().json(json!({ "message": "Unsubscribed" })),
        Ok(false) => HttpResponse::NotFound().json(json!({ "message": "Subscriber not found" })),
        Err(e) => server_error("unsubscribe", e),
    }
}
