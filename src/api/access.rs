use super::{server_error, JwtSecret};
use crate::auth::{authenticate, authenticate_admin};
use crate::db::Database;
use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Serialize, Deserialize)]
pub struct CreateMenuRequest {
    pub title: String,
    pub path: String,
    pub icon: Option<String>,
    #[serde(default)]
    pub sort_order: i64,
}

#[derive(Serialize, Deserialize, Default)]
pub struct UpdateMenuRequest {
    pub title: Option<String>,
    pub path: Option<String>,
    pub icon: Option<String>,
    pub sort_order: Option<i64>,
}

/// The navigation for whoever is calling. This is what the admin panel
/// renders as its sidebar.
pub async fn my_menus(
    req: HttpRequest,
    db: web::Data<Database>,
    secret: web::Data<JwtSecret>,
) -> HttpResponse {
    let claims = match authenticate(&req, &secret.0) {
        Ok(claims) => claims,
        Err(e) => return e.error_response(),
    };
    match db.menus_for_role(&claims.role).await {
        Ok(menus) => HttpResponse::Ok().json(menus),
        Err(e) => server_error("my_menus", e),
    }
}

pub async fn list_roles(
    req: HttpRequest,
    db: web::Data<Database>,
    secret: web::Data<JwtSecret>,
) -> HttpResponse {
    if let Err(e) = authenticate_admin(&req, &secret.0) {
        return e.error_response();
    }
    match db.list_roles().await {
        Ok(roles) => HttpResponse::Ok().json(roles),
        Err(e) => server_error("list_roles", e),
    }
}

pub async fn list_menus(
    req: HttpRequest,
    db: web::Data<Database>,
    secret: web::Data<JwtSecret>,
) -> HttpResponse {
    if let Err(e) = authenticate_admin(&req, &secret.0) {
        return e.error_response();
    }
    match db.list_menus().await {
        Ok(menus) => HttpResponse::Ok().json(menus),
        Err(e) => server_error("list_menus", e),
    }
}

pub async fn create_menu(
    req: HttpRequest,
    db: web::Data<Database>,
    secret: web::Data<JwtSecret>,
    request: web::Json<CreateMenuRequest>,
) -> HttpResponse {
    if let Err(e) = authenticate_admin(&req, &secret.0) {
        return e.error_response();
    }
    if request.title.trim().is_empty() || request.path.trim().is_empty() {
        return HttpResponse::BadRequest().json(json!({ "message": "Title and path are required" }));
    }
    match db
        .insert_menu(
            request.title.trim(),
            request.path.trim(),
            request.icon.as_deref(),
            request.sort_order,
        )
        .await
    {
        Ok(id) => match db.get_menu(id).await {
            Ok(Some(menu)) => HttpResponse::Created().json(json!({
                "message": "Menu created",
                "menu": menu,
            })),
            Ok(None) => server_error("create_menu", "inserted menu missing"),
            Err(e) => server_error("create_menu", e),
        },
        Err(e) => server_error("create_menu", e),
    }
}

pub async fn update_menu(
    req: HttpRequest,
    db: web::Data<Database>,
    secret: web::Data<JwtSecret>,
    id: web::Path<i64>,
    request: web::Json<UpdateMenuRequest>,
) -> HttpResponse {
    if let Err(e) = authenticate_admin(&req, &secret.0) {
        return e.error_response();
    }
    match db
        .update_menu(
            id.into_inner(),
            request.title.as_deref(),
            request.path.as_deref(),
            request.icon.as_deref().map(Some),
            request.sort_order,
        )
        .await
    {
        Ok(Some(menu)) => HttpResponse::Ok().json(json!({
            "message": "Menu updated",
            "menu": menu,
        })),
        Ok(None) => HttpResponse::NotFound().json(json!({ "message": "Menu not found" })),
        Err(e) => server_error("update_menu", e),
    }
}

pub async fn delete_menu(
    req: HttpRequest,
    db: web::Data<Database>,
    secret: web::Data<JwtSecret>,
    id: web::Path<i64>,
) -> HttpResponse {
    if let Err(e) = authenticate_admin(&req, &secret.0) {
        return e.error_response();
    }
    match db.soft_delete_menu(id.into_inner()).await {
        Ok(true) => HttpResponse::Ok().json(json!({ "message": "Menu deleted" })),
        Ok(false) => HttpResponse::NotFound().json(json!({ "message": "Menu not found" })),
        Err(e) => server_error("delete_menu", e),
    }
}

pub async fn assign_menu(
    req: HttpRequest,
    db: web::Data<Database>,
    secret: web::Data<JwtSecret>,
    path: web::Path<(i64, i64)>,
) -> HttpResponse {
    if let Err(e) = authenticate_admin(&req, &secret.0) {
        return e.error_response();
    }
    let (role_id, menu_id) = path.into_inner();
    match db.get_menu(menu_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return HttpResponse::NotFound().json(json!({ "message": "Menu not found" })),
        Err(e) => return server_error("assign_menu", e),
    }
    match db.assign_menu_to_role(role_id, menu_id).await {
        Ok(()) => HttpResponse::Ok().json(json!({ "message": "Menu assigned" })),
        Err(e) => server_error("assign_menu", e),
    }
}

pub async fn unassign_menu(
    req: HttpRequest,
    db: web::Data<Database>,
    secret: web::Data<JwtSecret>,
    path: web::Path<(i64, i64)>,
) -> HttpResponse {
    if let Err(e) = authenticate_admin(&req, &secret.0) {
        return e.error_response();
    }
    let (role_id, menu_id) = path.into_inner();
    match db.unassign_menu_from_role(role_id, menu_id).await {
        Ok(true) => HttpResponse::Ok().json(json!({ "message": "Menu unassigned" })),
        Ok(false) => {
            HttpResponse::NotFound().json(json!({ "message": "Menu is not assigned to this role" }))
        }
        Err(e) => server_error("unassign_menu", e),
    }
}
