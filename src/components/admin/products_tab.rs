use crate::components::admin::data_table::{DataTable, Modal, TableRow};
use crate::models::product::Product;
use crate::utils::format::format_price;
use leptos::*;
use leptos_dom::ev::SubmitEvent;
use serde_json::json;

/// Product management: the shared table plus a modal form that covers both
/// create and edit.
#[component]
pub fn ProductsTab() -> impl IntoView {
    let (version, set_version) = create_signal(0u32);
    let products = create_local_resource(
        move || version.get(),
        |_| async move {
            gloo_net::http::Request::get("/api/products")
                .send()
                .await
                .ok()?
                .json::<Vec<Product>>()
                .await
                .ok()
        },
    );

    let modal_open = create_rw_signal(false);
    // None while creating, the product id while editing
    let (editing, set_editing) = create_signal(Option::<i64>::None);
    let (name, set_name) = create_signal(String::new());
    let (slug, set_slug) = create_signal(String::new());
    let (description, set_description) = create_signal(String::new());
    let (price, set_price) = create_signal(String::new());
    let (stock, set_stock) = create_signal(String::new());
    let (status, set_status) = create_signal(Option::<String>::None);

    let rows = Signal::derive(move || {
        products
            .get()
            .flatten()
            .unwrap_or_default()
            .into_iter()
            .map(|p| TableRow {
                id: p.id,
                cells: vec![
                    p.name.clone(),
                    p.slug.clone(),
                    format_price(p.price_cents),
                    p.stock.to_string(),
                    p.category_name.clone().unwrap_or_default(),
                ],
            })
            .collect::<Vec<_>>()
    });

    let open_create = move |_| {
        set_editing.set(None);
        set_name.set(String::new());
        set_slug.set(String::new());
        set_description.set(String::new());
        set_price.set(String::new());
        set_stock.set(String::new());
        set_status.set(None);
        modal_open.set(true);
    };

    let open_edit = Callback::new(move |id: i64| {
        if let Some(product) = leptos::untrack(|| products.get())
            .flatten()
            .unwrap_or_default()
            .into_iter()
            .find(|p| p.id == id)
        {
            set_editing.set(Some(id));
            set_name.set(product.name);
            set_slug.set(product.slug);
            set_description.set(product.description);
            set_price.set(product.price_cents.to_string());
            set_stock.set(product.stock.to_string());
            set_status.set(None);
            modal_open.set(true);
        }
    });

    let delete = Callback::new(move |id: i64| {
        spawn_local(async move {
            let _ = gloo_net::http::Request::delete(&format!("/api/products/{}", id))
                .send()
                .await;
            set_version.update(|v| *v += 1);
        });
    });

    let submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        let price_cents: i64 = price.get_untracked().parse().unwrap_or(-1);
        let stock_count: i64 = stock.get_untracked().parse().unwrap_or(-1);
        if price_cents < 0 || stock_count < 0 {
            set_status.set(Some("Price and stock must be non-negative numbers".into()));
            return;
        }
        let editing = editing.get_untracked();
        spawn_local(async move {
            let (url, body, method_is_put) = match editing {
                Some(id) => (
                    format!("/api/products/{}", id),
                    json!({
                        "name": name.get_untracked(),
                        "description": description.get_untracked(),
                        "price_cents": price_cents,
                        "stock": stock_count,
                    }),
                    true,
                ),
                None => (
                    "/api/products".to_string(),
                    json!({
                        "name": name.get_untracked(),
                        "slug": slug.get_untracked(),
                        "description": description.get_untracked(),
                        "price_cents": price_cents,
                        "stock": stock_count,
                    }),
                    false,
                ),
            };
            let request = if method_is_put {
                gloo_net::http::Request::put(&url)
            } else {
                gloo_net::http::Request::post(&url)
            }
            .header("Content-Type", "application/json")
            .body(body.to_string());
            let Ok(request) = request else { return };
            match request.send().await {
                Ok(response) if response.status() < 300 => {
                    modal_open.set(false);
                    set_version.update(|v| *v += 1);
                }
                Ok(response) => {
                    let message = response
                        .json::<serde_json::Value>()
                        .await
                        .ok()
                        .and_then(|v| v["message"].as_str().map(|s| s.to_string()))
                        .unwrap_or_else(|| "Save failed".into());
                    set_status.set(Some(message));
                }
                Err(_) => set_status.set(Some("Could not reach the server".into())),
            }
        });
    };

    view! {
        <div class="admin-tab">
            <div class="tab-header">
                <h2>{ "Products" }</h2>
                <button on:click=open_create>{ "New Product" }</button>
            </div>
            <DataTable
                headers=vec!["Name", "Slug", "Price", "Stock", "Category"]
                rows=rows
                on_edit=open_edit
                on_delete=delete
            />
            <Modal title={"Product".to_string()} open=modal_open>
                <form on:submit=submit>
                    <input
                        type="text"
                        placeholder="Name"
                        prop:value={move || name.get()}
                        on:input=move |e| set_name.set(event_target_value(&e))
                    />
                    {move || editing.get().is_none().then(|| view! {
                        <input
                            type="text"
                            placeholder="Slug"
                            prop:value={move || slug.get()}
                            on:input=move |e| set_slug.set(event_target_value(&e))
                        />
                    })}
                    <textarea
                        placeholder="Description"
                        prop:value={move || description.get()}
                        on:input=move |e| set_description.set(event_target_value(&e))
                    />
                    <input
                        type="number"
                        placeholder="Price (cents)"
                        prop:value={move || price.get()}
                        on:input=move |e| set_price.set(event_target_value(&e))
                    />
                    <input
                        type="number"
                        placeholder="Stock"
                        prop:value={move || stock.get()}
                        on:input=move |e| set_stock.set(event_target_value(&e))
                    />
                    {move || status.get().map(|message| view! { <p class="error">{ message }</p> })}
                    <button type="submit">{ "Save" }</button>
                </form>
            </Modal>
        </div>
    }
}
