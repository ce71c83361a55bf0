#[cfg(feature = "ssr")]
use emporium::api;
#[cfg(feature = "ssr")]
use emporium::auth::{hash_password, jwt_secret};
#[cfg(feature = "ssr")]
use emporium::db::Database;

#[cfg(feature = "ssr")]
const UNLOCK_INTERVAL_SECS: u64 = 60;

#[cfg(feature = "ssr")]
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    use actix_files::Files;
    use actix_web::*;
    use api::JwtSecret;
    use emporium::app::App;
    use leptos::*;
    use leptos_actix::{generate_route_list, LeptosRoutes};

    // Initialize the database
    let db_path = std::env::var("EMPORIUM_DB").unwrap_or_else(|_| "emporium.db".to_string());
    let db = web::Data::new(Database::new(&db_path).unwrap());
    db.create_schema().await.unwrap(); // Ensure the schema is created
    db.seed_admin_menus().await.unwrap();

    // Bootstrap admin account so the back office is reachable on a fresh
    // database
    let admin_password =
        std::env::var("EMPORIUM_ADMIN_PASSWORD").unwrap_or_else(|_| "change-me-now".to_string());
    let admin_hash = hash_password(&admin_password).expect("hashing the admin password");
    db.seed_admin_user("admin", "admin@emporium.local", &admin_hash)
        .await
        .unwrap();
    println!("Schema created successfully!");

    // The auto-unlock loop: one scheduled query that releases expired
    // account locks
    let unlock_db = db.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(std::time::Duration::from_secs(UNLOCK_INTERVAL_SECS));
        loop {
            ticker.tick().await;
            if let Err(e) = unlock_db.unlock_expired_users().await {
                leptos::logging::error!("[UNLOCK] Scheduled unlock pass failed: {:?}", e);
            }
        }
    });

    let secret = web::Data::new(JwtSecret(jwt_secret()));

    // Load configuration
    let conf = get_configuration(None).await.unwrap();
    let addr = conf.leptos_options.site_addr;

    // Generate the list of routes in your Leptos App
    let routes = generate_route_list(App);
    println!("listening on http://{}", &addr);

    // Start the Actix Web server
    HttpServer::new(move || {
        let leptos_options = &conf.leptos_options;
        let site_root = &leptos_options.site_root;

        App::new()
            .app_data(db.clone())
            .app_data(secret.clone())
            // REST API, registered before the Leptos routes
            .service(
                web::scope("/api")
                    // accounts & sessions
                    .route("/auth/register", web::post().to(api::auth::register))
                    .route("/auth/login", web::post().to(api::auth::login))
                    .route("/auth/logout", web::post().to(api::auth::logout))
                    .route("/auth/me", web::get().to(api::auth::me))
                    // reviews
                    .route("/reviews", web::post().to(api::reviews::create_review))
                    .route("/reviews", web::get().to(api::reviews::get_all_reviews))
                    .route(
                        "/reviews/product/{product_id}",
                        web::get().to(api::reviews::get_reviews_by_product),
                    )
                    .route("/reviews/{id}", web::put().to(api::reviews::update_review))
                    .route("/reviews/{id}", web::delete().to(api::reviews::delete_review))
                    // catalog
                    .route("/products", web::get().to(api::products::list_products))
                    .route("/products", web::post().to(api::products::create_product))
                    .route(
                        "/products/slug/{slug}",
                        web::get().to(api::products::get_product_by_slug),
                    )
                    .route("/products/{id}", web::get().to(api::products::get_product))
                    .route("/products/{id}", web::put().to(api::products::update_product))
                    .route("/products/{id}", web::delete().to(api::products::delete_product))
                    .route("/categories", web::get().to(api::categories::list_categories))
                    .route("/categories", web::post().to(api::categories::create_category))
                    .route("/categories/{id}", web::put().to(api::categories::update_category))
                    .route(
                        "/categories/{id}",
                        web::delete().to(api::categories::delete_category),
                    )
                    .route("/collections", web::get().to(api::collections::list_collections))
                    .route("/collections", web::post().to(api::collections::create_collection))
                    .route(
                        "/collections/{id}",
                        web::delete().to(api::collections::delete_collection),
                    )
                    .route(
                        "/collections/{id}/products/{product_id}",
                        web::post().to(api::collections::add_collection_product),
                    )
                    .route(
                        "/collections/{id}/products/{product_id}",
                        web::delete().to(api::collections::remove_collection_product),
                    )
                    // content
                    .route("/banners", web::get().to(api::banners::list_banners))
                    .route("/banners", web::post().to(api::banners::create_banner))
                    .route("/banners/{id}", web::put().to(api::banners::update_banner))
                    .route("/banners/{id}", web::delete().to(api::banners::delete_banner))
                    .route("/posts", web::get().to(api::blog::list_published_posts))
                    .route("/posts", web::post().to(api::blog::create_post))
                    .route("/posts/all", web::get().to(api::blog::list_all_posts))
                    .route("/posts/slug/{slug}", web::get().to(api::blog::get_post_by_slug))
                    .route("/posts/{id}", web::put().to(api::blog::update_post))
                    .route("/posts/{id}", web::delete().to(api::blog::delete_post))
                    .route("/newsletter/subscribe", web::post().to(api::newsletter::subscribe))
                    .route("/newsletter", web::get().to(api::newsletter::list_subscribers))
                    .route("/newsletter/{id}", web::delete().to(api::newsletter::unsubscribe))
                    // access control
                    .route("/menus/mine", web::get().to(api::access::my_menus))
                    .route("/menus", web::get().to(api::access::list_menus))
                    .route("/menus", web::post().to(api::access::create_menu))
                    .route("/menus/{id}", web::put().to(api::access::update_menu))
                    .route("/menus/{id}", web::delete().to(api::access::delete_menu))
                    .route("/roles", web::get().to(api::access::list_roles))
                    .route(
                        "/roles/{role_id}/menus/{menu_id}",
                        web::post().to(api::access::assign_menu),
                    )
                    .route(
                        "/roles/{role_id}/menus/{menu_id}",
                        web::delete().to(api::access::unassign_menu),
                    )
                    // orders & payments
                    .route("/orders", web::post().to(api::orders::create_order))
                    .route("/orders", web::get().to(api::orders::list_all_orders))
                    .route("/orders/mine", web::get().to(api::orders::my_orders))
                    .route("/orders/{id}", web::get().to(api::orders::get_order))
                    .route("/orders/{id}/pay", web::post().to(api::orders::pay_order))
                    .route(
                        "/orders/{id}/status",
                        web::put().to(api::orders::update_order_status),
                    )
                    .route(
                        "/orders/{id}/payments",
                        web::get().to(api::orders::order_payments),
                    )
                    // analytics
                    .route(
                        "/analytics/summary",
                        web::get().to(api::analytics::dashboard_summary),
                    )
                    .route(
                        "/analytics/sales-by-day",
                        web::get().to(api::analytics::sales_by_day),
                    )
                    .route(
                        "/analytics/top-products",
                        web::get().to(api::analytics::top_products),
                    )
                    .route(
                        "/analytics/product-ratings",
                        web::get().to(api::analytics::product_ratings),
                    )
                    .route(
                        "/analytics/recent-orders",
                        web::get().to(api::analytics::recent_orders),
                    ),
            )
            // Serve JS/WASM/CSS from `pkg`
            .service(Files::new("/pkg", format!("{site_root}/pkg")))
            // Serve other assets from the `assets` directory
            .service(Files::new("/assets", site_root))
            // Serve the favicon from /favicon.ico
            .service(favicon)
            // Register Leptos routes
            .leptos_routes(leptos_options.to_owned(), routes.to_owned(), App)
            // Pass Leptos options to the app
            .app_data(web::Data::new(leptos_options.to_owned()))
    })
    .bind(&addr)?
    .run()
    .await
}

#[cfg(feature = "ssr")]
#[actix_web::get("favicon.ico")]
async fn favicon(
    leptos_options: actix_web::web::Data<leptos::LeptosOptions>,
) -> actix_web::Result<actix_files::NamedFile> {
    let leptos_options = leptos_options.into_inner();
    let site_root = &leptos_options.site_root;
    Ok(actix_files::NamedFile::open(format!(
        "{site_root}/favicon.ico"
    ))?)
}

#[cfg(not(any(feature = "ssr", feature = "csr")))]
pub fn main() {
    // no client-side main function
    // unless we want this to work with e.g., Trunk for pure client-side testing
    // see lib.rs for hydration function instead
    // see optional feature `csr` instead
}

#[cfg(all(not(feature = "ssr"), feature = "csr"))]
pub fn main() {
    // a client-side main function is required for using `trunk serve`
    // prefer using `cargo leptos serve` instead
    // to run: `trunk serve --open --features csr`
    use emporium::app::App;

    console_error_panic_hook::set_once();

    leptos::mount_to_body(App);
}
