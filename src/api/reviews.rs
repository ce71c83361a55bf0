use super::{server_error, JwtSecret};
use crate::auth::authenticate;
use crate::db::{Database, ReviewError};
use actix_web::{web, HttpRequest, HttpResponse};
use leptos::logging::log;
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Serialize, Deserialize)]
pub struct CreateReviewRequest {
    pub user_id: i64,
    pub product_id: i64,
    pub rating: i64,
    #[serde(default)]
    pub comment: String,
}

#[derive(Serialize, Deserialize, Default)]
pub struct UpdateReviewRequest {
    pub rating: Option<i64>,
    pub comment: Option<String>,
}

fn rating_in_bounds(rating: i64) -> bool {
    (1..=5).contains(&rating)
}

pub async fn create_review(
    req: HttpRequest,
    db: web::Data<Database>,
    secret: web::Data<JwtSecret>,
    request: web::Json<CreateReviewRequest>,
) -> HttpResponse {
    let claims = match authenticate(&req, &secret.0) {
        Ok(claims) => claims,
        Err(e) => return e.error_response(),
    };
    // A review is always submitted as oneself, admins included
    if request.user_id != claims.sub {
        return HttpResponse::Forbidden()
            .json(json!({ "message": "You can only review as yourself" }));
    }
    if !rating_in_bounds(request.rating) {
        return HttpResponse::BadRequest()
            .json(json!({ "message": "Rating must be between 1 and 5" }));
    }
    match db.get_product(request.product_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return HttpResponse::NotFound().json(json!({ "message": "Product not found" }))
        }
        Err(e) => return server_error("create_review", e),
    }

    log!(
        "[API] Review submission: user {} product {} rating {}",
        claims.sub,
        request.product_id,
        request.rating
    );
    match db
        .insert_review(claims.sub, request.product_id, request.rating, &request.comment)
        .await
    {
        Ok(review) => HttpResponse::Created().json(json!({
            "message": "Review created",
            "review": review,
        })),
        Err(ReviewError::Duplicate) => HttpResponse::BadRequest()
            .json(json!({ "message": "You have already reviewed this product" })),
        Err(ReviewError::Db(e)) => server_error("create_review", e),
    }
}

pub async fn get_reviews_by_product(
    db: web::Data<Database>,
    product_id: web::Path<i64>,
) -> HttpResponse {
    match db.get_reviews_by_product(product_id.into_inner()).await {
        Ok(reviews) if reviews.is_empty() => HttpResponse::Ok().json(json!({
            "message": "No reviews found for this product",
            "reviews": reviews,
        })),
        Ok(reviews) => HttpResponse::Ok().json(json!({
            "message": "Reviews retrieved",
            "reviews": reviews,
        })),
        Err(e) => server_error("get_reviews_by_product", e),
    }
}

pub async fn get_all_reviews(db: web::Data<Database>) -> HttpResponse {
    match db.get_all_reviews().await {
        Ok(reviews) if reviews.is_empty() => HttpResponse::Ok().json(json!({
            "message": "No reviews found",
            "reviews": reviews,
        })),
        Ok(reviews) => HttpResponse::Ok().json(json!({
            "message": "Reviews retrieved",
            "reviews": reviews,
        })),
        Err(e) => server_error("get_all_reviews", e),
    }
}

pub async fn update_review(
    req: HttpRequest,
    db: web::Data<Database>,
    secret: web::Data<JwtSecret>,
    review_id: web::Path<i64>,
    request: web::Json<UpdateReviewRequest>,
) -> HttpResponse {
    let claims = match authenticate(&req, &secret.0) {
        Ok(claims) => claims,
        Err(e) => return e.error_response(),
    };
    let review_id = review_id.into_inner();

    let review = match db.get_review(review_id).await {
        Ok(Some(review)) => review,
        Ok(None) => return HttpResponse::NotFound().json(json!({ "message": "Review not found" })),
        Err(e) => return server_error("update_review", e),
    };
    if !claims.may_act_for(review.user_id) {
        return HttpResponse::Forbidden()
            .json(json!({ "message": "You can only modify your own reviews" }));
    }
    if request.rating.is_none() && request.comment.is_none() {
        return HttpResponse::BadRequest().json(json!({ "message": "Nothing to update" }));
    }
    if let Some(rating) = request.rating {
        if !rating_in_bounds(rating) {
            return HttpResponse::BadRequest()
                .json(json!({ "message": "Rating must be between 1 and 5" }));
        }
    }

    match db
        .update_review(review_id, request.rating, request.comment.as_deref())
        .await
    {
        Ok(Some(review)) => HttpResponse::Ok().json(json!({
            "message": "Review updated",
            "review": review,
        })),
        Ok(None) => HttpResponse::NotFound().json(json!({ "message": "Review not found" })),
        Err(e) => server_error("update_review", e),
    }
}

pub async fn delete_review(
    req: HttpRequest,
    db: web::Data<Database>,
    secret: web::Data<JwtSecret>,
    review_id: web::Path<i64>,
) -> HttpResponse {
    let claims = match authenticate(&req, &secret.0) {
        Ok(claims) => claims,
        Err(e) => return e.error_response(),
    };
    let review_id = review_id.into_inner();

    let review = match db.get_review(review_id).await {
        Ok(Some(review)) => review,
        Ok(None) => return HttpResponse::NotFound().json(json!({ "message": "Review not found" })),
        Err(e) => return server_error("delete_review", e),
    };
    if !claims.may_act_for(review.user_id) {
        return HttpResponse::Forbidden()
            .json(json!({ "message": "You can only delete your own reviews" }));
    }

    match db.soft_delete_review(review_id).await {
        Ok(true) => HttpResponse::Ok().json(json!({ "message": "Review deleted" })),
        Ok(false) => HttpResponse::NotFound().json(json!({ "message": "Review not found" })),
        Err(e) => server_error("delete_review", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{auth_cookie, issue_token, Claims};
    use crate::db::test_support::{create_test_db, insert_test_product, insert_test_user};
    use actix_web::cookie::Cookie;
    use actix_web::{test, web, App};

    const SECRET: &[u8] = b"review-test-secret";

    fn cookie_for(user_id: i64, username: &str, role: &str) -> Cookie<'static> {
        let token = issue_token(SECRET, &Claims::new(user_id, username, role)).unwrap();
        auth_cookie(token)
    }

    macro_rules! review_app {
        ($db:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($db))
                    .app_data(web::Data::new(crate::api::JwtSecret(SECRET.to_vec())))
                    .route("/reviews", web::post().to(create_review))
                    .route("/reviews", web::get().to(get_all_reviews))
                    .route(
                        "/reviews/product/{product_id}",
                        web::get().to(get_reviews_by_product),
                    )
                    .route("/reviews/{id}", web::put().to(update_review))
                    .route("/reviews/{id}", web::delete().to(delete_review)),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn test_create_review_requires_auth() {
        let db = create_test_db().await;
        let app = review_app!(db);

        let req = test::TestRequest::post()
            .uri("/reviews")
            .set_json(json!({ "user_id": 1, "product_id": 1, "rating": 4 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401);
    }

    #[actix_web::test]
    async fn test_create_review_rejects_out_of_range_rating() {
        let db = create_test_db().await;
        let user = insert_test_user(&db, "alice").await;
        let product = insert_test_product(&db, "Walnut Desk", 45900, 4).await;
        let app = review_app!(db);

        for rating in [0, 6] {
            let req = test::TestRequest::post()
                .uri("/reviews")
                .cookie(cookie_for(user, "alice", "Customer"))
                .set_json(json!({ "user_id": user, "product_id": product, "rating": rating }))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), 400);
            let body: serde_json::Value = test::read_body_json(resp).await;
            assert_eq!(body["message"], "Rating must be between 1 and 5");
        }
    }

    #[actix_web::test]
    async fn test_create_review_rejects_submitting_as_someone_else() {
        let db = create_test_db().await;
        let alice = insert_test_user(&db, "alice").await;
        let bob = insert_test_user(&db, "bob").await;
        let product = insert_test_product(&db, "Walnut Desk", 45900, 4).await;
        let app = review_app!(db);

        let req = test::TestRequest::post()
            .uri("/reviews")
            .cookie(cookie_for(bob, "bob", "Customer"))
            .set_json(json!({ "user_id": alice, "product_id": product, "rating": 4 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 403);
    }

    #[actix_web::test]
    async fn test_duplicate_review_rejected() {
        let db = create_test_db().await;
        let user = insert_test_user(&db, "alice").await;
        let product = insert_test_product(&db, "Walnut Desk", 45900, 4).await;
        let app = review_app!(db);

        let first = test::TestRequest::post()
            .uri("/reviews")
            .cookie(cookie_for(user, "alice", "Customer"))
            .set_json(json!({ "user_id": user, "product_id": product, "rating": 4, "comment": "Solid" }))
            .to_request();
        assert_eq!(test::call_service(&app, first).await.status(), 201);

        let second = test::TestRequest::post()
            .uri("/reviews")
            .cookie(cookie_for(user, "alice", "Customer"))
            .set_json(json!({ "user_id": user, "product_id": product, "rating": 2 }))
            .to_request();
        let resp = test::call_service(&app, second).await;
        assert_eq!(resp.status(), 400);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "You have already reviewed this product");
    }

    #[actix_web::test]
    async fn test_update_enforces_owner_or_admin() {
        let db = create_test_db().await;
        let alice = insert_test_user(&db, "alice").await;
        let bob = insert_test_user(&db, "bob").await;
        let product = insert_test_product(&db, "Walnut Desk", 45900, 4).await;
        let review = db.insert_review(alice, product, 4, "Solid").await.unwrap();
        let app = review_app!(db);

        // A stranger is refused
        let req = test::TestRequest::put()
            .uri(&format!("/reviews/{}", review.id))
            .cookie(cookie_for(bob, "bob", "Customer"))
            .set_json(json!({ "rating": 1 }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 403);

        // An admin may moderate any review
        let req = test::TestRequest::put()
            .uri(&format!("/reviews/{}", review.id))
            .cookie(cookie_for(999, "root", "Admin"))
            .set_json(json!({ "comment": "Moderated" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["review"]["comment"], "Moderated");
        assert_eq!(body["review"]["rating"], 4, "rating untouched by partial update");
    }

    #[actix_web::test]
    async fn test_update_missing_review_is_404() {
        let db = create_test_db().await;
        let user = insert_test_user(&db, "alice").await;
        let app = review_app!(db);

        let req = test::TestRequest::put()
            .uri("/reviews/41")
            .cookie(cookie_for(user, "alice", "Customer"))
            .set_json(json!({ "rating": 3 }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 404);
    }

    #[actix_web::test]
    async fn test_deleted_review_disappears_from_reads() {
        let db = create_test_db().await;
        let user = insert_test_user(&db, "alice").await;
        let product = insert_test_product(&db, "Walnut Desk", 45900, 4).await;
        let review = db.insert_review(user, product, 5, "Great").await.unwrap();
        let app = review_app!(db);

        let req = test::TestRequest::delete()
            .uri(&format!("/reviews/{}", review.id))
            .cookie(cookie_for(user, "alice", "Customer"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 200);

        let req = test::TestRequest::get()
            .uri(&format!("/reviews/product/{}", product))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "No reviews found for this product");
        assert_eq!(body["reviews"].as_array().unwrap().len(), 0);

        // Deleting it again is a 404
        let req = test::TestRequest::delete()
            .uri(&format!("/reviews/{}", review.id))
            .cookie(cookie_for(user, "alice", "Customer"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 404);
    }
}
