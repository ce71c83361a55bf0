use crate::components::admin::data_table::{DataTable, TableRow};
use crate::models::category::Category;
use crate::models::collection::Collection;
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
pub fn CategoriesTab() -> impl IntoView {
    let (version, set_version) = create_signal(0u32);
    let categories = create_local_resource(
        move || version.get(),
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

    let (name, set_name) = create_signal(String::new());
    let (slug, set_slug) = create_signal(String::new());

    let rows = Signal::derive(move || {
        categories
            .get()
            .flatten()
            .unwrap_or_default()
            .into_iter()
            .map(|c| TableRow {
                id: c.id,
                cells: vec![c.name.clone(), c.slug.clone(), c.description.clone().unwrap_or_default()],
            })
            .collect::<Vec<_>>()
    });

    let delete = Callback::new(move |id: i64| {
        spawn_local(async move {
            let _ = gloo_net::http::Request::delete(&format!("/api/categories/{}", id))
                .send()
                .await;
            set_version.update(|v| *v += 1);
        });
    });

    let submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        spawn_local(async move {
            let body = json!({ "name": name.get_untracked(), "slug": slug.get_untracked() });
            if post_json("/api/categories", body).await {
                set_name.set(String::new());
                set_slug.set(String::new());
                set_version.update(|v| *v += 1);
            }
        });
    };

    view! {
        <div class="admin-tab">
            <h2>{ "Categories" }</h2>
            <form class="inline-form" on:submit=submit>
                <input
                    type="text"
                    placeholder="Name"
                    prop:value={move || name.get()}
                    on:input=move |e| set_name.set(event_target_value(&e))
                />
                <input
                    type="text"
                    placeholder="Slug"
                    prop:value={move || slug.get()}
                    on:input=move |e| set_slug.set(event_target_value(&e))
                />
                <button type="submit">{ "Add" }</button>
            </form>
            <DataTable
                headers=vec!["Name", "Slug", "Description"]
                rows=rows
                on_delete=delete
            />
        </div>
    }
}

#[component]
pub fn CollectionsTab() -> impl IntoView {
    let (version, set_version) = create_signal(0u32);
    let collections = create_local_resource(
        move || version.get(),
        |_| async move {
            gloo_net::http::Request::get("/api/collections")
                .send()
                .await
                .ok()?
                .json::<Vec<Collection>>()
                .await
                .ok()
        },
    );

    let (name, set_name) = create_signal(String::new());
    let (slug, set_slug) = create_signal(String::new());
    // "collection_id:product_id" entry for the membership form
    let (membership, set_membership) = create_signal(String::new());

    let rows = Signal::derive(move || {
        collections
            .get()
            .flatten()
            .unwrap_or_default()
            .into_iter()
            .map(|c| TableRow {
                id: c.id,
                cells: vec![c.name.clone(), c.slug.clone()],
            })
            .collect::<Vec<_>>()
    });

    let delete = Callback::new(move |id: i64| {
        spawn_local(async move {
            let _ = gloo_net::http::Request::delete(&format!("/api/collections/{}", id))
                .send()
                .await;
            set_version.update(|v| *v += 1);
        });
    });

    let submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        spawn_local(async move {
            let body = json!({ "name": name.get_untracked(), "slug": slug.get_untracked() });
            if post_json("/api/collections", body).await {
                set_name.set(String::new());
                set_slug.set(String::new());
                set_version.update(|v| *v += 1);
            }
        });
    };

    let add_membership = move |ev: SubmitEvent| {
        ev.prevent_default();
        let entry = membership.get_untracked();
        let Some((collection_id, product_id)) = entry.split_once(':') else { return };
        let url = format!("/api/collections/{}/products/{}", collection_id, product_id);
        spawn_local(async move {
            if let Ok(request) = gloo_net::http::Request::post(&url).body("") {
                let _ = request.send().await;
            }
            set_membership.set(String::new());
        });
    };

    view! {
        <div class="admin-tab">
            <h2>{ "Collections" }</h2>
            <form class="inline-form" on:submit=submit>
                <input
                    type="text"
                    placeholder="Name"
                    prop:value={move || name.get()}
                    on:input=move |e| set_name.set(event_target_value(&e))
                />
                <input
                    type="text"
                    placeholder="Slug"
                    prop:value={move || slug.get()}
                    on:input=move |e| set_slug.set(event_target_value(&e))
                />
                <button type="submit">{ "Add" }</button>
            </form>
            <DataTable headers=vec!["Name", "Slug"] rows=rows on_delete=delete />
            <form class="inline-form" on:submit=add_membership>
                <input
                    type="text"
                    placeholder="collection_id:product_id"
                    prop:value={move || membership.get()}
                    on:input=move |e| set_membership.set(event_target_value(&e))
                />
                <button type="submit">{ "Add product to collection" }</button>
            </form>
        </div>
    }
}
