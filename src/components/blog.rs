use crate::models::post::Post;
use leptos::*;
use leptos_router::{use_params_map, A};

#[component]
pub fn BlogList() -> impl IntoView {
    let posts = create_local_resource(
        || (),
        |_| async move {
            gloo_net::http::Request::get("/api/posts")
                .send()
                .await
                .ok()?
                .json::<Vec<Post>>()
                .await
                .ok()
        },
    );

    view! {
        <div class="blog">
            <h2>{ "Journal" }</h2>
            {move || match posts.get().flatten() {
                Some(posts) if !posts.is_empty() => posts.into_iter().map(|post| {
                    view! {
                        <article>
                            <A href={format!("/blog/{}", post.slug)}>
                                <h3>{ post.title.clone() }</h3>
                            </A>
                            <span class="byline">
                                { format!(
                                    "by {} on {}",
                                    post.author_name.clone().unwrap_or_default(),
                                    post.created_at,
                                ) }
                            </span>
                        </article>
                    }
                }).collect::<Vec<_>>().into_view(),
                _ => view! { <p>{ "Nothing published yet." }</p> }.into_view(),
            }}
        </div>
    }
}

#[component]
pub fn BlogPostView() -> impl IntoView {
    let params = use_params_map();
    let slug = move || params.with(|p| p.get("slug").cloned().unwrap_or_default());

    let post = create_local_resource(slug, |slug| async move {
        gloo_net::http::Request::get(&format!("/api/posts/slug/{}", slug))
            .send()
            .await
            .ok()?
            .json::<Post>()
            .await
            .ok()
    });

    view! {
        <div class="blog-post">
            {move || match post.get().flatten() {
                Some(post) => view! {
                    <article>
                        <h2>{ post.title.clone() }</h2>
                        <span class="byline">
                            { format!(
                                "by {} on {}",
                                post.author_name.clone().unwrap_or_default(),
                                post.created_at,
                            ) }
                        </span>
                        <p>{ post.body.clone() }</p>
                    </article>
                }.into_view(),
                None => view! { <p>{ "Post not found." }</p> }.into_view(),
            }}
        </div>
    }
}
