use super::{server_error, JwtSecret};
use crate::auth::authenticate_admin;
use crate::db::{is_constraint_violation, Database, NewProduct, ProductPatch};
use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;

#[derive(Serialize, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: String,
    pub price_cents: i64,
    pub stock: i64,
    pub category_id: Option<i64>,
    pub image_url: Option<String>,
}

#[derive(Serialize, Deserialize, Default)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price_cents: Option<i64>,
    pub stock: Option<i64>,
    pub category_id: Option<i64>,
    pub image_url: Option<String>,
}

pub async fn list_products(
    db: web::Data<Database>,
    query: web::Query<HashMap<String, String>>,
) -> HttpResponse {
    let category = query.get("category").map(|s| s.as_str());
    let collection = query.get("collection").map(|s| s.as_str());
    match db.list_products(category, collection).await {
        Ok(products) => HttpResponse::Ok().json(products),
        Err(e) => server_error("list_products", e),
    }
}

pub async fn get_product(db: web::Data<Database>, id: web::Path<i64>) -> HttpResponse {
    match db.get_product(id.into_inner()).await {
        Ok(Some(product)) => HttpResponse::Ok().json(product),
        Ok(None) => HttpResponse::NotFound().json(json!({ "message": "Product not found" })),
        Err(e) => server_error("get_product", e),
    }
}

pub async fn get_product_by_slug(db: web::Data<Database>, slug: web::Path<String>) -> HttpResponse {
    match db.get_product_by_slug(&slug.into_inner()).await {
        Ok(Some(product)) => HttpResponse::Ok().json(product),
        Ok(None) => HttpResponse::NotFound().json(json!({ "message": "Product not found" })),
        Err(e) => server_error("get_product_by_slug", e),
    }
}

pub async fn create_product(
    req: HttpRequest,
    db: web::Data<Database>,
    secret: web::Data<JwtSecret>,
    request: web::Json<CreateProductRequest>,
) -> HttpResponse {
    if let Err(e) = authenticate_admin(&req, &secret.0) {
        return e.error_response();
    }
    if request.name.trim().is_empty() || request.slug.trim().is_empty() {
        return HttpResponse::BadRequest().json(json!({ "message": "Name and slug are required" }));
    }
    if request.price_cents < 0 || request.stock < 0 {
        return HttpResponse::BadRequest()
            .json(json!({ "message": "Price and stock cannot be negative" }));
    }

    let new_product = NewProduct {
        name: request.name.trim().to_string(),
        slug: request.slug.trim().to_string(),
        description: request.description.clone(),
        price_cents: request.price_cents,
        stock: request.stock,
        category_id: request.category_id,
        image_url: request.image_url.clone(),
    };
    match db.insert_product(&new_product).await {
        Ok(id) => match db.get_product(id).await {
            Ok(Some(product)) => HttpResponse::Created().json(json!({
                "message": "Product created",
                "product": product,
            })),
            Ok(None) => server_error("create_product", "inserted product missing"),
            Err(e) => server_error("create_product", e),
        },
        Err(e) if is_constraint_violation(&e) => {
            HttpResponse::BadRequest().json(json!({ "message": "Slug is already in use" }))
        }
        Err(e) => server_error("create_product", e),
    }
}

pub async fn update_product(
    req: HttpRequest,
    db: web::Data<Database>,
    secret: web::Data<JwtSecret>,
    id: web::Path<i64>,
    request: web::Json<UpdateProductRequest>,
) -> HttpResponse {
    if let Err(e) = authenticate_admin(&req, &secret.0) {
        return e.error_response();
    }
    if let Some(price_cents) = request.price_cents {
        if price_cents < 0 {
            return HttpResponse::BadRequest()
                .json(json!({ "message": "Price cannot be negative" }));
        }
    }
    if let Some(stock) = request.stock {
        if stock < 0 {
            return HttpResponse::BadRequest()
                .json(json!({ "message": "Stock cannot be negative" }));
        }
    }

    let patch = ProductPatch {
        name: request.name.clone(),
        description: request.description.clone(),
        price_cents: request.price_cents,
        stock: request.stock,
        category_id: request.category_id.map(Some),
        image_url: request.image_url.clone().map(Some),
    };
    match db.update_product(id.into_inner(), &patch).await {
        Ok(Some(product)) => HttpResponse::Ok().json(json!({
            "message": "Product updated",
            "product": product,
        })),
        Ok(None) => HttpResponse::NotFound().json(json!({ "message": "Product not found" })),
        Err(e) => server_error("update_product", e),
    }
}

pub async fn delete_product(
    req: HttpRequest,
    db: web::Data<Database>,
    secret: web::Data<JwtSecret>,
    id: web::Path<i64>,
) -> HttpResponse {
    if let Err(e) = authenticate_admin(&req, &secret.0) {
        return e.error_response();
    }
    match db.soft_delete_product(id.into_inner()).await {
        Ok(true) => HttpResponse::Ok().json(json!({ "message": "Product deleted" })),
        Ok(false) => HttpResponse::NotFound().json(json!({ "message": "Product not found" })),
        Err(e) => server_error("delete_product", e),
    }
}
