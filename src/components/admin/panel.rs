use crate::components::admin::access_tab::AccessTab;
use crate::components::admin::catalog_tabs::{CategoriesTab, CollectionsTab};
use crate::components::admin::content_tabs::{BannersTab, BlogTab, NewsletterTab};
use crate::components::admin::dashboard::Dashboard;
use crate::components::admin::orders_tab::OrdersTab;
use crate::components::admin::products_tab::ProductsTab;
use crate::components::admin::reviews_tab::ReviewsTab;
use crate::models::role::Menu;
use leptos::*;
use leptos_router::{use_params_map, A};

/// The back-office shell: sidebar navigation driven by the caller's
/// role-menu assignments, content switched on the route.
#[component]
pub fn AdminPanel() -> impl IntoView {
    let menus = create_local_resource(
        || (),
        |_| async move {
            let response = gloo_net::http::Request::get("/api/menus/mine").send().await.ok()?;
            if response.status() != 200 {
                return None;
            }
            response.json::<Vec<Menu>>().await.ok()
        },
    );

    let params = use_params_map();
    let tab = move || {
        params.with(|p| p.get("tab").cloned()).unwrap_or_else(|| "dashboard".into())
    };

    view! {
        <div class="admin-panel">
            <aside class="sidebar">
                {move || match menus.get() {
                    Some(Some(menus)) if !menus.is_empty() => menus.into_iter().map(|menu| {
                        view! { <A href={menu.path.clone()}>{ menu.title.clone() }</A> }
                    }).collect::<Vec<_>>().into_view(),
                    Some(_) => view! {
                        <p>{ "You do not have access to the back office." }</p>
                    }.into_view(),
                    None => view! { <p>{ "Loading..." }</p> }.into_view(),
                }}
            </aside>
            <section class="admin-content">
                {move || match tab().as_str() {
                    "dashboard" => view! { <Dashboard /> }.into_view(),
                    "products" => view! { <ProductsTab /> }.into_view(),
                    "categories" => view! { <CategoriesTab /> }.into_view(),
                    "collections" => view! { <CollectionsTab /> }.into_view(),
                    "reviews" => view! { <ReviewsTab /> }.into_view(),
                    "orders" => view! { <OrdersTab /> }.into_view(),
                    "banners" => view! { <BannersTab /> }.into_view(),
                    "blog" => view! { <BlogTab /> }.into_view(),
                    "newsletter" => view! { <NewsletterTab /> }.into_view(),
                    "access" => view! { <AccessTab /> }.into_view(),
                    other => view! { <p>{ format!("Unknown section '{}'", other) }</p> }.into_view(),
                }}
            </section>
        </div>
    }
}
