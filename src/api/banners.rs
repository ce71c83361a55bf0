use super::{server_error, JwtSecret};
use crate::auth::authenticate_admin;
use crate::db::Database;
use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Serialize, Deserialize)]
pub struct CreateBannerRequest {
    pub title: String,
    pub image_url: String,
    pub link_url: Option<String>,
    #[serde(default)]
    pub sort_order: i64,
}

#[derive(Serialize, Deserialize, Default)]
pub struct UpdateBannerRequest {
    pub title: Option<String>,
    pub image_url: Option<String>,
    pub link_url: Option<String>,
    pub sort_order: Option<i64>,
}

pub async fn list_banners(db: web::Data<Database>) -> HttpResponse {
    match db.list_active_banners().await {
        Ok(banners) => HttpResponse::Ok().json(banners),
        Err(e) => server_error("list_banners", e),
    }
}

pub async fn create_banner(
    req: HttpRequest,
    db: web::Data<Database>,
    secret: web::Data<JwtSecret>,
    request: web::Json<CreateBannerRequest>,
) -> HttpResponse {
    if let Err(e) = authenticate_admin(&req, &secret.0) {
        return e.error_response();
    }
    if request.title.trim().is_empty() || request.image_url.trim().is_empty() {
        return HttpResponse::BadRequest()
            .json(json!({ "message": "Title and image URL are required" }));
    }
    match db
        .insert_banner(
            request.title.trim(),
            request.image_url.trim(),
            request.link_url.as_deref(),
            request.sort_order,
        )
        .await
    {
        Ok(id) => match db.get_banner(id).await {
            Ok(Some(banner)) => HttpResponse::Created().json(json!({
                "message": "Banner created",
                "banner": banner,
            })),
            Ok(None) => server_error("create_banner", "inserted banner missing"),
            Err(e) => server_error("create_banner", e),
        },
        Err(e) => server_error("create_banner", e),
    }
}

pub async fn update_banner(
    req: HttpRequest,
    db: web::Data<Database>,
    secret: web::Data<JwtSecret>,
    id: web::Path<i64>,
    request: web::Json<UpdateBannerRequest>,
) -> HttpResponse {
    if let Err(e) = authenticate_admin(&req, &secret.0) {
        return e.error_response();
    }
    match db
        .update_banner(
            id.into_inner(),
            request.title.as_deref(),
            request.image_url.as_deref(),
            request.link_url.as_deref().map(Some),
            request.sort_order,
        )
        .await
    {
        Ok(Some(banner)) => HttpResponse::Ok().json(json!({
            "message": "Banner updated",
            "banner": banner,
        })),
        Ok(None) => HttpResponse::NotFound().json(json!({ "message": "Banner not found" })),
        Err(e) => server_error("update_banner", e),
    }
}

pub async fn delete_banner(
    req: HttpRequest,
    db: web::Data<Database>,
    secret: web::Data<JwtSecret>,
    id: web::Path<i64>,
) -> HttpResponse {
    if let Err(e) = authenticate_admin(&req, &secret.0) {
        return e.error_response();
    }
    match db.soft_delete_banner(id.into_inner()).await {
        Ok(true) => HttpResponse::Ok().json(json!({ "message": "Banner deleted" })),
        Ok(false) => HttpResponse::NotFound().json(json!({ "message": "Banner not found" })),
        Err(e) => server_error("delete_banner", e),
    }
}
