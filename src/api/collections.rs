use super::{server_error, JwtSecret};
use crate::auth::authenticate_admin;
use crate::db::{is_constraint_violation, Database};
use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Serialize, Deserialize)]
pub struct CreateCollectionRequest {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
}

pub async fn list_collections(db: web::Data<Database>) -> HttpResponse {
    match db.list_collections().await {
        Ok(collections) => HttpResponse::Ok().json(collections),
        Err(e) => server_error("list_collections", e),
    }
}

pub async fn create_collection(
    req: HttpRequest,
    db: web::Data<Database>,
    secret: web::Data<JwtSecret>,
    request: web::Json<CreateCollectionRequest>,
) -> HttpResponse {
    if let Err(e) = authenticate_admin(&req, &secret.0) {
        return e.error_response();
    }
    if request.name.trim().is_empty() || request.slug.trim().is_empty() {
        return HttpResponse::BadRequest().json(json!({ "message": "Name and slug are required" }));
    }

    match db
        .insert_collection(
            request.name.trim(),
            request.slug.trim(),
            request.description.as_deref(),
        )
        .await
    {
        Ok(id) => HttpResponse::Created().json(json!({
            "message": "Collection created",
            "collection": { "id": id, "name": request.name.trim(), "slug": request.slug.trim() },
        })),
        Err(e) if is_constraint_violation(&e) => {
            HttpResponse::BadRequest().json(json!({ "message": "Slug is already in use" }))
        }
        Err(e) => server_error("create_collection", e),
    }
}

pub async fn delete_collection(
    req: HttpRequest,
    db: web::Data<Database>,
    secret: web::Data<JwtSecret>,
    id: web::Path<i64>,
) -> HttpResponse {
    if let Err(e) = authenticate_admin(&req, &secret.0) {
        return e.error_response();
    }
    match db.soft_delete_collection(id.into_inner()).await {
        Ok(true) => HttpResponse::Ok().json(json!({ "message": "Collection deleted" })),
        Ok(false) => HttpResponse::NotFound().json(json!({ "message": "Collection not found" })),
        Err(e) => server_error("delete_collection", e),
    }
}

pub async fn add_collection_product(
    req: HttpRequest,
    db: web::Data<Database>,
    secret: web::Data<JwtSecret>,
    path: web::Path<(i64, i64)>,
) -> HttpResponse {
    if let Err(e) = authenticate_admin(&req, &secret.0) {
        return e.error_response();
    }
    let (collection_id, product_id) = path.into_inner();
    // Validate both ends so a typo'd id fails loudly instead of writing a
    // dangling mapping
    match db.get_product(product_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return HttpResponse::NotFound().json(json!({ "message": "Product not found" }))
        }
        Err(e) => return server_error("add_collection_product", e),
    }
    match db.add_product_to_collection(collection_id, product_id).await {
        Ok(()) => HttpResponse::Ok().json(json!({ "message": "Product added to collection" })),
        Err(e) => server_error("add_collection_product", e),
    }
}

pub async fn remove_collection_product(
    req: HttpRequest,
    db: web::Data<Database>,
    secret: web::Data<JwtSecret>,
    path: web::Path<(i64, i64)>,
) -> HttpResponse {
    if let Err(e) = authenticate_admin(&req, &secret.0) {
        return e.error_response();
    }
    let (collection_id, product_id) = path.into_inner();
    match db
        .remove_product_from_collection(collection_id, product_id)
        .await
    {
        Ok(true) => HttpResponse::Ok().json(json!({ "message": "Product removed from collection" })),
        Ok(false) => {
            HttpResponse::NotFound().json(json!({ "message": "Product is not in this collection" }))
        }
        Err(e) => server_error("remove_collection_product", e),
    }
}
