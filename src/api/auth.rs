use super::{server_error, JwtSecret};
use crate::auth::{
    auth_cookie, authenticate, clear_auth_cookie, hash_password, issue_token, verify_password,
    Claims,
};
use crate::db::{is_constraint_violation, Database};
use crate::models::user::SessionUser;
use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;
use leptos::logging::log;
use serde::{Deserialize, Serialize};
use serde_json::json;

const MAX_LOGIN_FAILURES: i64 = 5;
const LOCK_MINUTES: i64 = 15;

#[derive(Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

pub async fn register(
    db: web::Data<Database>,
    request: web::Json<RegisterRequest>,
) -> HttpResponse {
    let username = request.username.trim();
    let email = request.email.trim();
    if username.is_empty() || email.is_empty() {
        return HttpResponse::BadRequest()
            .json(json!({ "message": "Username and email are required" }));
    }
    if !email.contains('@') {
        return HttpResponse::BadRequest().json(json!({ "message": "A valid email is required" }));
    }
    if request.password.len() < 8 {
        return HttpResponse::BadRequest()
            .json(json!({ "message": "Password must be at least 8 characters" }));
    }

    let password_hash = match hash_password(&request.password) {
        Ok(hash) => hash,
        Err(e) => return e.error_response(),
    };
    let role_id = match db.role_id_by_name("Customer").await {
        Ok(Some(id)) => id,
        Ok(None) => return server_error("register", "Customer role missing"),
        Err(e) => return server_error("register", e),
    };

    match db.create_user(username, email, &password_hash, role_id).await {
        Ok(id) => {
            log!("[API] Registered user {} (id {})", username, id);
            HttpResponse::Created().json(json!({
                "message": "Account created",
                "user": { "id": id, "username": username, "role": "Customer" },
            }))
        }
        Err(e) if is_constraint_violation(&e) => HttpResponse::BadRequest()
            .json(json!({ "message": "Username or email already in use" })),
        Err(e) => server_error("register", e),
    }
}

/// Compares the stored lock timestamp against now. Timestamps are the
/// database's own 'YYYY-MM-DD HH:MM:SS' text, so string order is time order.
fn lock_is_active(locked_until: &Option<String>) -> bool {
    match locked_until {
        Some(until) => *until > Utc::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        None => false,
    }
}

pub async fn login(
    db: web::Data<Database>,
    secret: web::Data<JwtSecret>,
    request: web::Json<LoginRequest>,
) -> HttpResponse {
    let row = match db.get_user_auth(request.username.trim()).await {
        Ok(Some(row)) => row,
        Ok(None) => {
            return HttpResponse::Unauthorized()
                .json(json!({ "message": "Invalid username or password" }))
        }
        Err(e) => return server_error("login", e),
    };

    if row.is_active != "Y" {
        return HttpResponse::Forbidden().json(json!({ "message": "Account is disabled" }));
    }
    if lock_is_active(&row.locked_until) {
        log!("[API] Login rejected for locked account {}", row.username);
        return HttpResponse::Forbidden()
            .json(json!({ "message": "Account is locked. Try again later" }));
    }

    if !verify_password(&row.password_hash, &request.password) {
        let failures = match db
            .record_login_failure(row.id, MAX_LOGIN_FAILURES, LOCK_MINUTES)
            .await
        {
            Ok(failures) => failures,
            Err(e) => return server_error("login", e),
        };
        if failures >= MAX_LOGIN_FAILURES {
            return HttpResponse::Forbidden()
                .json(json!({ "message": "Account is locked. Try again later" }));
        }
        return HttpResponse::Unauthorized()
            .json(json!({ "message": "Invalid username or password" }));
    }

    if let Err(e) = db.clear_login_failures(row.id).await {
        return server_error("login", e);
    }

    let claims = Claims::new(row.id, &row.username, &row.role_name);
    let token = match issue_token(&secret.0, &claims) {
        Ok(token) => token,
        Err(e) => return e.error_response(),
    };
    log!("[API] User {} logged in", row.username);
    HttpResponse::Ok().cookie(auth_cookie(token)).json(json!({
        "message": "Logged in",
        "user": SessionUser { id: row.id, username: row.username, role: row.role_name },
    }))
}

pub async fn logout() -> HttpResponse {
    HttpResponse::Ok()
        .cookie(clear_auth_cookie())
        .json(json!({ "message": "Logged out" }))
}

pub async fn me(req: HttpRequest, secret: web::Data<JwtSecret>) -> HttpResponse {
    match authenticate(&req, &secret.0) {
        Ok(claims) => HttpResponse::Ok().json(json!({
            "user": SessionUser { id: claims.sub, username: claims.username, role: claims.role },
        })),
        Err(e) => e.error_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::create_test_db;
    use actix_web::{test, web, App};

    const SECRET: &[u8] = b"auth-test-secret";

    macro_rules! auth_app {
        ($db:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($db))
                    .app_data(web::Data::new(crate::api::JwtSecret(SECRET.to_vec())))
                    .route("/auth/register", web::post().to(register))
                    .route("/auth/login", web::post().to(login))
                    .route("/auth/me", web::get().to(me)),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn test_register_validation_and_duplicates() {
        let db = create_test_db().await;
        let app = auth_app!(db);

        let req = test::TestRequest::post()
            .uri("/auth/register")
            .set_json(json!({ "username": "alice", "email": "not-an-email", "password": "longenough" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 400);

        let req = test::TestRequest::post()
            .uri("/auth/register")
            .set_json(json!({ "username": "alice", "email": "alice@example.com", "password": "short" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 400);

        let req = test::TestRequest::post()
            .uri("/auth/register")
            .set_json(json!({ "username": "alice", "email": "alice@example.com", "password": "longenough" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 201);

        // Same username again
        let req = test::TestRequest::post()
            .uri("/auth/register")
            .set_json(json!({ "username": "alice", "email": "other@example.com", "password": "longenough" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Username or email already in use");
    }

    #[actix_web::test]
    async fn test_login_sets_session_cookie() {
        let db = create_test_db().await;
        let app = auth_app!(db);

        let req = test::TestRequest::post()
            .uri("/auth/register")
            .set_json(json!({ "username": "bob", "email": "bob@example.com", "password": "longenough" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 201);

        let req = test::TestRequest::post()
            .uri("/auth/login")
            .set_json(json!({ "username": "bob", "password": "longenough" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);
        let cookie = resp
            .response()
            .cookies()
            .find(|c| c.name() == crate::auth::AUTH_COOKIE)
            .expect("session cookie set");
        let token = cookie.value().to_string();

        let req = test::TestRequest::get()
            .uri("/auth/me")
            .cookie(crate::auth::auth_cookie(token))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["user"]["username"], "bob");
        assert_eq!(body["user"]["role"], "Customer");
    }

    #[actix_web::test]
    async fn test_repeated_failures_lock_the_account() {
        let db = create_test_db().await;
        let app = auth_app!(db);

        let req = test::TestRequest::post()
            .uri("/auth/register")
            .set_json(json!({ "username": "carol", "email": "carol@example.com", "password": "longenough" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 201);

        for attempt in 1..=5 {
            let req = test::TestRequest::post()
                .uri("/auth/login")
                .set_json(json!({ "username": "carol", "password": "wrong" }))
                .to_request();
            let resp = test::call_service(&app, req).await;
            if attempt < 5 {
                assert_eq!(resp.status(), 401, "attempt {} should be a plain rejection", attempt);
            } else {
                assert_eq!(resp.status(), 403, "attempt {} should lock the account", attempt);
            }
        }

        // The right password is refused while the lock holds
        let req = test::TestRequest::post()
            .uri("/auth/login")
            .set_json(json!({ "username": "carol", "password": "longenough" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 403);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Account is locked. Try again later");
    }

    #[actix_web::test]
    async fn test_unknown_user_login_is_unauthorized() {
        let db = create_test_db().await;
        let app = auth_app!(db);

        let req = test::TestRequest::post()
            .uri("/auth/login")
            .set_json(json!({ "username": "ghost", "password": "whatever" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Invalid username or password");
    }
}
