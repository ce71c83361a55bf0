use super::{server_error, JwtSecret};
use crate::auth::authenticate_admin;
use crate::db::{is_constraint_violation, Database};
use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Serialize, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub published: bool,
}

#[derive(Serialize, Deserialize, Default)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub body: Option<String>,
    pub published: Option<bool>,
}

/// Public blog index: published posts only.
pub async fn list_published_posts(db: web::Data<Database>) -> HttpResponse {
    match db.list_posts(true).await {
        Ok(posts) => HttpResponse::Ok().json(posts),
        Err(e) => server_error("list_published_posts", e),
    }
}

pub async fn get_post_by_slug(db: web::Data<Database>, slug: web::Path<String>) -> HttpResponse {
    match db.get_published_post_by_slug(&slug.into_inner()).await {
        Ok(Some(post)) => HttpResponse::Ok().json(post),
        Ok(None) => HttpResponse::NotFound().json(json!({ "message": "Post not found" })),
        Err(e) => server_error("get_post_by_slug", e),
    }
}

/// Admin index: drafts included.
pub async fn list_all_posts(
    req: HttpRequest,
    db: web::Data<Database>,
    secret: web::Data<JwtSecret>,
) -> HttpResponse {
    if let Err(e) = authenticate_admin(&req, &secret.0) {
        return e.error_response();
    }
    match db.list_posts(false).await {
        Ok(posts) => HttpResponse::Ok().json(posts),
        Err(e) => server_error("list_all_posts", e),
    }
}

pub async fn create_post(
    req: HttpRequest,
    db: web::Data<Database>,
    secret: web::Data<JwtSecret>,
    request: web::Json<CreatePostRequest>,
) -> HttpResponse {
    let claims = match authenticate_admin(&req, &secret.0) {
        Ok(claims) => claims,
        Err(e) => return e.error_response(),
    };
    if request.title.trim().is_empty() || request.slug.trim().is_empty() {
        return HttpResponse::BadRequest()
            .json(json!({ "message": "Title and slug are required" }));
    }

    match db
        .insert_post(
            request.title.trim(),
            request.slug.trim(),
            &request.body,
            claims.sub,
            request.published,
        )
        .await
    {
        Ok(id) => match db.get_post(id).await {
            Ok(Some(post)) => HttpResponse::Created().json(json!({
                "message": "Post created",
                "post": post,
            })),
            Ok(None) => server_error("create_post", "inserted post missing"),
            Err(e) => server_error("create_post", e),
        },
        Err(e) if is_constraint_violation(&e) => {
            HttpResponse::BadRequest().json(json!({ "message": "Slug is already in use" }))
        }
        Err(e) => server_error("create_post", e),
    }
}

pub async fn update_post(
    req: HttpRequest,
    db: web::Data<Database>,
    secret: web::Data<JwtSecret>,
    id: web::Path<i64>,
    request: web::Json<UpdatePostRequest>,
) -> HttpResponse {
    if let Err(e) = authenticate_admin(&req, &secret.0) {
        return e.error_response();
    }
    match db
        .update_post(
            id.into_inner(),
            request.title.as_deref(),
            request.body.as_deref(),
            request.published,
        )
        .await
    {
        Ok(Some(post)) => HttpResponse::Ok().json(json!({
            "message": "Post updated",
            "post": post,
        })),
        Ok(None) => HttpResponse::NotFound().json(json!({ "message": "Post not found" })),
        Err(e) => server_error("update_post", e),
    }
}

pub async fn delete_post(
    req: HttpRequest,
    db: web::Data<Database>,
    secret: web::Data<JwtSecret>,
    id: web::Path<i64>,
) -> HttpResponse {
    if let Err(e) = authenticate_admin(&req, &secret.0) {
        return e.error_response();
    }
    match db.delete_post(id.into_inner()).await {
        Ok(true) => HttpResponse::Ok().json(json!({ "message": "Post deleted" })),
        Ok(false) => HttpResponse::NotFound().json(json!({ "message": "Post not found" })),
        Err(e) => server_error("delete_post", e),
    }
}
