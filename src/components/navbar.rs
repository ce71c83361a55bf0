use crate::models::user::SessionUser;
use leptos::*;
use leptos_router::A;
use serde::Deserialize;

#[derive(Deserialize)]
struct MePayload {
    user: SessionUser,
}

/// Top navigation. Shows the signed-in user and an admin link when the
/// session carries the Admin role.
#[component]
pub fn Navbar(cart_count: Signal<usize>) -> impl IntoView {
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

    let logout = move |_| {
        spawn_local(async move {
            let _ = gloo_net::http::Request::post("/api/auth/logout").send().await;
            let _ = window().location().set_href("/");
        });
    };

    view! {
        <nav class="navbar">
            <A href="/" class="brand">{ "Emporium" }</A>
            <A href="/products">{ "Shop" }</A>
            <A href="/blog">{ "Blog" }</A>
            <A href="/cart">{ move || format!("Cart ({})", cart_count.get()) }</A>
            {move || match session.get().flatten() {
                Some(user) => view! {
                    <span class="session">
                        {if user.role == "Admin" {
                            Some(view! { <A href="/admin">{ "Admin" }</A> })
                        } else {
                            None
                        }}
                        <A href="/orders">{ "My Orders" }</A>
                        <span>{ user.username.clone() }</span>
                        <button on:click=logout>{ "Log out" }</button>
                    </span>
                }.into_view(),
                None => view! {
                    <span class="session">
                        <A href="/login">{ "Log in" }</A>
                    </span>
                }.into_view(),
            }}
        </nav>
    }
}
