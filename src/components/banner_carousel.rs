use crate::models::banner::Banner;
use leptos::*;

/// Home page hero strip: active banners in their configured order.
#[component]
pub fn BannerCarousel() -> impl IntoView {
    let banners = create_local_resource(
        || (),
        |_| async move {
            gloo_net::http::Request::get("/api/banners")
                .send()
                .await
                .ok()?
                .json::<Vec<Banner>>()
                .await
                .ok()
        },
    );

    view! {
        <div class="banner-carousel">
            {move || banners.get().flatten().unwrap_or_default().into_iter().map(|banner| {
                view! {
                    <a href={banner.link_url.clone().unwrap_or_else(|| "/products".into())}>
                        <img src={banner.image_url.clone()} alt={banner.title.clone()} />
                        <span>{ banner.title.clone() }</span>
                    </a>
                }
            }).collect::<Vec<_>>()}
        </div>
    }
}
