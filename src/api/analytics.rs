use super::{server_error, JwtSecret};
use crate::auth::authenticate_admin;
use crate::db::Database;
use actix_web::{web, HttpRequest, HttpResponse};
use std::collections::HashMap;

fn query_i64(query: &HashMap<String, String>, key: &str, default: i64) -> i64 {
    query
        .get(key)
        .and_then(|v| v.parse().ok())
        .filter(|v| *v > 0)
        .unwrap_or(default)
}

pub async fn dashboard_summary(
    req: HttpRequest,
    db: web::Data<Database>,
    secret: web::Data<JwtSecret>,
) -> HttpResponse {
    if let Err(e) = authenticate_admin(&req, &secret.0) {
        return e.error_response();
    }
    match db.dashboard_summary().await {
        Ok(summary) => HttpResponse::Ok().json(summary),
        Err(e) => server_error("dashboard_summary", e),
    }
}

pub async fn sales_by_day(
    req: HttpRequest,
    db: web::Data<Database>,
    secret: web::Data<JwtSecret>,
    query: web::Query<HashMap<String, String>>,
) -> HttpResponse {
    if let Err(e) = authenticate_admin(&req, &secret.0) {
        return e.error_response();
    }
    let days = query_i64(&query, "days", 30);
    match db.sales_by_day(days).await {
        Ok(series) => HttpResponse::Ok().json(series),
        Err(e) => server_error("sales_by_day", e),
    }
}

pub async fn top_products(
    req: HttpRequest,
    db: web::Data<Database>,
    secret: web::Data<JwtSecret>,
    query: web::Query<HashMap<String, String>>,
) -> HttpResponse {
    if let Err(e) = authenticate_admin(&req, &secret.0) {
        return e.error_response();
    }
    let limit = query_i64(&query, "limit", 5);
    match db.top_products(limit).await {
        Ok(products) => HttpResponse::Ok().json(products),
        Err(e) => server_error("top_products", e),
    }
}

pub async fn product_ratings(
    req: HttpRequest,
    db: web::Data<Database>,
    secret: web::Data<JwtSecret>,
) -> HttpResponse {
    if let Err(e) = authenticate_admin(&req, &secret.0) {
        return e.error_response();
    }
    match db.product_ratings().await {
        Ok(ratings) => HttpResponse::Ok().json(ratings),
        Err(e) => server_error("product_ratings", e),
    }
}

pub async fn recent_orders(
    req: HttpRequest,
    db: web::Data<Database>,
    secret: web::Data<JwtSecret>,
    query: web::Query<HashMap<String, String>>,
) -> HttpResponse {
    if let Err(e) = authenticate_admin(&req, &secret.0) {
        return e.error_response();
    }
    let limit = query_i64(&query, "limit", 10);
    match db.recent_orders(limit).await {
        Ok(orders) => HttpResponse::Ok().json(orders),
        Err(e) => server_error("recent_orders", e),
    }
}
