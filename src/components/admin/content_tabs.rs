use crate::components::admin::data_table::{DataTable, TableRow};
use crate::models::banner::Banner;
use crate::models::newsletter::Subscriber;
use crate::models::post::Post;
use leptos::*;
use leptos_dom::ev::SubmitEvent;
use serde_json::json;

async fn post_json(url: &str, body: serde_json::Value) -> bool {
    let request = gloo_net::http::Request::post(url)
        .header("Content-Type", "application/json")
        .body(body.to_string());
    match request {
        Ok(request) => matches!(request.send().await, Ok(r) if r.status() < 300),
        Err(_) => false,
    }
}

#[component]
pub fn BannersTab() -> impl IntoView {
    let (version, set_version) = create_signal(0u32);
    let banners = create_local_resource(
        move || version.get(),
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

    let (title, set_title) = create_signal(String::new());
    let (image_url, set_image_url) = create_signal(String::new());
    let (link_url, set_link_url) = create_signal(String::new());

    let rows = Signal::derive(move || {
        banners
            .get()
            .flatten()
            .unwrap_or_default()
            .into_iter()
            .map(|b| TableRow {
                id: b.id,
                cells: vec![
                    b.title.clone(),
                    b.image_url.clone(),
                    b.link_url.clone().unwrap_or_default(),
                    b.sort_order.to_string(),
                ],
            })
            .collect::<Vec<_>>()
    });

    let delete = Callback::new(move |id: i64| {
        spawn_local(async move {
            let _ = gloo_net::http::Request::delete(&format!("/api/banners/{}", id))
                .send()
                .await;
            set_version.update(|v| *v += 1);
        });
    });

    let submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        spawn_local(async move {
            let link = link_url.get_untracked();
            let body = json!({
                "title": title.get_untracked(),
                "image_url": image_url.get_untracked(),
                "link_url": if link.is_empty() { None } else { Some(link) },
            });
            if post_json("/api/banners", body).await {
                set_title.set(String::new());
                set_image_url.set(String::new());
                set_link_url.set(String::new());
                set_version.update(|v| *v += 1);
            }
        });
    };

    view! {
        <div class="admin-tab">
            <h2>{ "Banners" }</h2>
            <form class="inline-form" on:submit=submit>
                <input
                    type="text"
                    placeholder="Title"
                    prop:value={move || title.get()}
                    on:input=move |e| set_title.set(event_target_value(&e))
                />
                <input
                    type="text"
                    placeholder="Image URL"
                    prop:value={move || image_url.get()}
                    on:input=move |e| set_image_url.set(event_target_value(&e))
                />
                <input
                    type="text"
                    placeholder="Link (optional)"
                    prop:value={move || link_url.get()}
                    on:input=move |e| set_link_url.set(event_target_value(&e))
                />
                <button type="submit">{ "Add" }</button>
            </form>
            <DataTable
                headers=vec!["Title", "Image", "Link", "Order"]
                rows=rows
                on_delete=delete
            />
        </div>
    }
}

#[component]
pub fn BlogTab() -> impl IntoView {
    let (version, set_version) = create_signal(0u32);
    let posts = create_local_resource(
        move || version.get(),
        |_| async move {
            let response = gloo_net::http::Request::get("/api/posts/all").send().await.ok()?;
            if response.status() != 200 {
                return None;
            }
            response.json::<Vec<Post>>().await.ok()
        },
    );

    let (title, set_title) = create_signal(String::new());
    let (slug, set_slug) = create_signal(String::new());
    let (body, set_body) = create_signal(String::new());

    let delete = Callback::new(move |id: i64| {
        spawn_local(async move {
            let _ = gloo_net::http::Request::delete(&format!("/api/posts/{}", id))
                .send()
                .await;
            set_version.update(|v| *v += 1);
        });
    });

    // Flips the published flag for a draft, or back to draft
    let toggle_publish = move |id: i64, publish: bool| {
        spawn_local(async move {
            let request = gloo_net::http::Request::put(&format!("/api/posts/{}", id))
                .header("Content-Type", "application/json")
                .body(json!({ "published": publish }).to_string());
            if let Ok(request) = request {
                let _ = request.send().await;
            }
            set_version.update(|v| *v += 1);
        });
    };

    let submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        spawn_local(async move {
            let payload = json!({
                "title": title.get_untracked(),
                "slug": slug.get_untracked(),
                "body": body.get_untracked(),
            });
            if post_json("/api/posts", payload).await {
                set_title.set(String::new());
                set_slug.set(String::new());
                set_body.set(String::new());
                set_version.update(|v| *v += 1);
            }
        });
    };

    view! {
        <div class="admin-tab">
            <h2>{ "Blog" }</h2>
            <form class="inline-form" on:submit=submit>
                <input
                    type="text"
                    placeholder="Title"
                    prop:value={move || title.get()}
                    on:input=move |e| set_title.set(event_target_value(&e))
                />
                <input
                    type="text"
                    placeholder="Slug"
                    prop:value={move || slug.get()}
                    on:input=move |e| set_slug.set(event_target_value(&e))
                />
                <textarea
                    placeholder="Body"
                    prop:value={move || body.get()}
                    on:input=move |e| set_body.set(event_target_value(&e))
                />
                <button type="submit">{ "Save draft" }</button>
            </form>
            <table class="data-table">
                <thead>
                    <tr>
                        <th>{ "Title" }</th><th>{ "Slug" }</th><th>{ "Author" }</th>
                        <th>{ "Published" }</th><th>{ "Actions" }</th>
                    </tr>
                </thead>
                <tbody>
                    {move || posts.get().flatten().unwrap_or_default().into_iter().map(|post| {
                        let id = post.id;
                        let published = post.published == "Y";
                        view! {
                            <tr>
                                <td>{ post.title.clone() }</td>
                                <td>{ post.slug.clone() }</td>
                                <td>{ post.author_name.clone().unwrap_or_default() }</td>
                                <td>{ if published { "Yes" } else { "No" } }</td>
                                <td class="actions">
                                    <button on:click=move |_| toggle_publish(id, !published)>
                                        { if published { "Unpublish" } else { "Publish" } }
                                    </button>
                                    <button class="danger" on:click=move |_| delete.call(id)>
                                        { "Delete" }
                                    </button>
                                </td>
                            </tr>
                        }
                    }).collect::<Vec<_>>()}
                </tbody>
            </table>
        </div>
    }
}

#[component]
pub fn NewsletterTab() -> impl IntoView {
    let (version, set_version) = create_signal(0u32);
    let subscribers = create_local_resource(
        move || version.get(),
        |_| async move {
            let response = gloo_net::http::Request::get("/api/newsletter").send().await.ok()?;
            if response.status() != 200 {
                return None;
            }
            response.json::<Vec<Subscriber>>().await.ok()
        },
    );

    let rows = Signal::derive(move || {
        subscribers
            .get()
            .flatten()
            .unwrap_or_default()
            .into_iter()
            .map(|s| TableRow {
                id: s.id,
                cells: vec![s.email.clone(), s.subscribed_at.clone()],
            })
            .collect::<Vec<_>>()
    });

    let unsubscribe = Callback::new(move |id: i64| {
        spawn_local(async move {
            let _ = gloo_net::http::Request::delete(&format!("/api/newsletter/{}", id))
                .send()
                .await;
            set_version.update(|v| *v += 1);
        });
    });

    view! {
        <div class="admin-tab">
            <h2>{ "Newsletter" }</h2>
            <DataTable
                headers=vec!["Email", "Subscribed"]
                rows=rows
                on_delete=unsubscribe
            />
        </div>
    }
}
