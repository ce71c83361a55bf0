use crate::models::category::Category;
use crate::models::product::Product;
use crate::utils::format::format_price;
use leptos::*;
use leptos_router::A;

/// Product grid with a category filter. Refetches whenever the selected
/// category changes.
#[component]
pub fn ProductsList() -> impl IntoView {
    let (category, set_category) = create_signal(String::new());

    let categories = create_local_resource(
        || (),
        |_| async move {
            gloo_net::http::Request::get("/api/categories")
                .send()
                .await
                .ok()?
                .json::<Vec<Category>>()
                .await
                .ok()
        },
    );

    let products = create_local_resource(
        move || category.get(),
        |category| async move {
            let url = if category.is_empty() {
                "/api/products".to_string()
            } else {
                format!("/api/products?category={}", category)
            };
            gloo_net::http::Request::get(&url)
                .send()
                .await
                .ok()?
                .json::<Vec<Product>>()
                .await
                .ok()
        },
    );

    view! {
        <div class="products-page">
            <h2>{ "Products" }</h2>
            <select on:change=move |e| set_category.set(event_target_value(&e))>
                <option value="">{ "All categories" }</option>
                {move || categories.get().flatten().unwrap_or_default().into_iter().map(|c| {
                    view! { <option value={c.slug.clone()}>{ c.name.clone() }</option> }
                }).collect::<Vec<_>>()}
            </select>
            <div class="product-grid">
                {move || match products.get().flatten() {
                    Some(products) if !products.is_empty() => products.into_iter().map(|product| {
                        view! {
                            <div class="product-card">
                                {product.image_url.clone().map(|url| view! {
                                    <img src={url} alt={product.name.clone()} />
                                })}
                                <A href={format!("/products/{}", product.slug)}>
                                    <strong>{ product.name.clone() }</strong>
                                </A>
                                <span class="price">{ format_price(product.price_cents) }</span>
                                {product.category_name.clone().map(|name| view! {
                                    <span class="category">{ name }</span>
                                })}
                            </div>
                        }
                    }).collect::<Vec<_>>().into_view(),
                    _ => view! { <p>{ "No products found." }</p> }.into_view(),
                }}
            </div>
        </div>
    }
}
