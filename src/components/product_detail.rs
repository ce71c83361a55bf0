use crate::components::review_form::ReviewForm;
use crate::components::reviews_list::ReviewsList;
use crate::models::product::Product;
use crate::models::review::Review;
use crate::models::user::SessionUser;
use crate::utils::format::format_price;
use leptos::*;
use leptos_router::use_params_map;
use serde::Deserialize;

#[derive(Deserialize)]
struct ReviewsPayload {
    #[allow(dead_code)]
    message: String,
    reviews: Vec<Review>,
}

#[derive(Deserialize)]
struct MePayload {
    user: SessionUser,
}

/// Product page: details, add-to-cart, reviews, and the review form for
/// signed-in customers.
#[component]
pub fn ProductDetail(on_add_to_cart: Callback<Product>) -> impl IntoView {
    let params = use_params_map();
    let slug = move || params.with(|p| p.get("slug").cloned().unwrap_or_default());

    let product = create_local_resource(slug, |slug| async move {
        gloo_net::http::Request::get(&format!("/api/products/slug/{}", slug))
            .send()
            .await
            .ok()?
            .json::<Product>()
            .await
            .ok()
    });

    // Bumped after a successful review submission to refetch the list
    let (reviews_version, set_reviews_version) = create_signal(0u32);
    let reviews = create_local_resource(
        move || (product.get().flatten().map(|p| p.id), reviews_version.get()),
        |(product_id, _)| async move {
            let product_id = product_id?;
            gloo_net::http::Request::get(&format!("/api/reviews/product/{}", product_id))
                .send()
                .await
                .ok()?
                .json::<ReviewsPayload>()
                .await
                .ok()
                .map(|payload| payload.reviews)
        },
    );

    let session = create_local_resource(
        || (),
        |_| async move {
            let response = gloo_net::http::Request::get("/api/auth/me").send().await.ok()?;
            if response.status() != 200 {
                return None;
            }
            response.json::<MePayload>().await.ok().map(|p| p.user)
        },
    );

    view! {
        <div class="product-detail">
            {move || match product.get().flatten() {
                Some(product) => {
                    let for_cart = product.clone();
                    view! {
                        <div>
                            <h2>{ product.name.clone() }</h2>
                            {product.image_url.clone().map(|url| view! {
                                <img src={url} alt={product.name.clone()} />
                            })}
                            <p>{ product.description.clone() }</p>
                            <p class="price">{ format_price(product.price_cents) }</p>
                            {if product.stock > 0 {
                                view! {
                                    <button on:click=move |_| on_add_to_cart.call(for_cart.clone())>
                                        { "Add to Cart" }
                                    </button>
                                }.into_view()
                            } else {
                                view! { <p class="out-of-stock">{ "Out of stock" }</p> }.into_view()
                            }}
                        </div>
                    }.into_view()
                }
                None => view! { <p>{ "Loading product..." }</p> }.into_view(),
            }}

            {move || reviews.get().flatten().map(|reviews| view! {
                <ReviewsList reviews=reviews />
            })}

            {move || {
                let product_id = product.get().flatten().map(|p| p.id);
                let user = session.get().flatten();
                match (product_id, user) {
                    (Some(product_id), Some(user)) => view! {
                        <ReviewForm
                            product_id=product_id
                            user_id=user.id
                            on_submitted=move || set_reviews_version.update(|v| *v += 1)
                        />
                    }.into_view(),
                    (Some(_), None) => view! {
                        <p>{ "Log in to write a review." }</p>
                    }.into_view(),
                    _ => ().into_view(),
                }
            }}
        </div>
    }
}
