use super::{server_error, JwtSecret};
use crate::auth::authenticate_admin;
use crate::db::{is_constraint_violation, Database};
use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Serialize, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
}

#[derive(Serialize, Deserialize, Default)]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

pub async fn list_categories(db: web::Data<Database>) -> HttpResponse {
    match db.list_categories().await {
        Ok(categories) => HttpResponse::Ok().json(categories),
        Err(e) => server_error("list_categories", e),
    }
}

pub async fn create_category(
    req: HttpRequest,
    db: web::Data<Database>,
    secret: web::Data<JwtSecret>,
    request: web::Json<CreateCategoryRequest>,
) -> HttpResponse {
    if let Err(e) = authenticate_admin(&req, &secret.0) {
        return e.error_response();
    }
    if request.name.trim().is_empty() || request.slug.trim().is_empty() {
        return HttpResponse::BadRequest().json(json!({ "message": "Name and slug are required" }));
    }

    match db
        .insert_category(
            request.name.trim(),
            request.slug.trim(),
            request.description.as_deref(),
        )
        .await
    {
        Ok(id) => match db.get_category(id).await {
            Ok(Some(category)) => HttpResponse::Created().json(json!({
                "message": "Category created",
                "category": category,
            })),
            Ok(None) => server_error("create_category", "inserted category missing"),
            Err(e) => server_error("create_category", e),
        },
        Err(e) if is_constraint_violation(&e) => {
            HttpResponse::BadRequest().json(json!({ "message": "Slug is already in use" }))
        }
        Err(e) => server_error("create_category", e),
    }
}

pub async fn update_category(
    req: HttpRequest,
    db: web::Data<Database>,
    secret: web::Data<JwtSecret>,
    id: web::Path<i64>,
    request: web::Json<UpdateCategoryRequest>,
) -> HttpResponse {
    if let Err(e) = authenticate_admin(&req, &secret.0) {
        return e.error_response();
    }
    match db
        .update_category(
            id.into_inner(),
            request.name.as_deref(),
            request.description.as_deref(),
        )
        .await
    {
        Ok(Some(category)) => HttpResponse::Ok().json(json!({
            "message": "Category updated",
            "category": category,
        })),
        Ok(None) => HttpResponse::NotFound().json(json!({ "message": "Category not found" })),
        Err(e) => server_error("update_category", e),
    }
}

pub async fn delete_category(
    req: HttpRequest,
    db: web::Data<Database>,
    secret: web::Data<JwtSecret>,
    id: web::Path<i64>,
) -> HttpResponse {
    if let Err(e) = authenticate_admin(&req, &secret.0) {
        return e.error_response();
    }
    match db.soft_delete_category(id.into_inner()).await {
        Ok(true) => HttpResponse::Ok().json(json!({ "message": "Category deleted" })),
        Ok(false) => HttpResponse::NotFound().json(json!({ "message": "Category not found" })),
        Err(e) => server_error("delete_category", e),
    }
}
