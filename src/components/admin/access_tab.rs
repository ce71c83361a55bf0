use crate::components::admin::data_table::{DataTable, TableRow};
use crate::models::role::{Menu, Role};
use leptos::*;
use leptos_dom::ev::SubmitEvent;
use serde_json::json;

/// Role and menu administration: create navigation entries and wire them
/// to roles.
#[component]
pub fn AccessTab() -> impl IntoView {
    let (version, set_version) = create_signal(0u32);
    let menus = create_local_resource(
        move || version.get(),
        |_| async move {
            let response = gloo_net::http::Request::get("/api/menus").send().await.ok()?;
            if response.status() != 200 {
                return None;
            }
            response.json::<Vec<Menu>>().await.ok()
        },
    );
    let roles = create_local_resource(
        || (),
        |_| async move {
            let response = gloo_net::http::Request::get("/api/roles").send().await.ok()?;
            if response.status() != 200 {
                return None;
            }
            response.json::<Vec<Role>>().await.ok()
        },
    );

    let (title, set_title) = create_signal(String::new());
    let (path, set_path) = create_signal(String::new());
    let (role_id, set_role_id) = create_signal(String::new());
    let (menu_id, set_menu_id) = create_signal(String::new());

    let rows = Signal::derive(move || {
        menus
            .get()
            .flatten()
            .unwrap_or_default()
            .into_iter()
            .map(|m| TableRow {
                id: m.id,
                cells: vec![m.title.clone(), m.path.clone(), m.sort_order.to_string()],
            })
            .collect::<Vec<_>>()
    });

    let delete = Callback::new(move |id: i64| {
        spawn_local(async move {
            let _ = gloo_net::http::Request::delete(&format!("/api/menus/{}", id))
                .send()
                .await;
            set_version.update(|v| *v += 1);
        });
    });

    let create_menu = move |ev: SubmitEvent| {
        ev.prevent_default();
        spawn_local(async move {
            let body = json!({ "title": title.get_untracked(), "path": path.get_untracked() });
            let request = gloo_net::http::Request::post("/api/menus")
                .header("Content-Type", "application/json")
                .body(body.to_string());
            if let Ok(request) = request {
                let _ = request.send().await;
            }
            set_title.set(String::new());
            set_path.set(String::new());
            set_version.update(|v| *v += 1);
        });
    };

    let assign = move |ev: SubmitEvent| {
        ev.prevent_default();
        let role = role_id.get_untracked();
        let menu = menu_id.get_untracked();
        if role.is_empty() || menu.is_empty() {
            return;
        }
        let url = format!("/api/roles/{}/menus/{}", role, menu);
        spawn_local(async move {
            if let Ok(request) = gloo_net::http::Request::post(&url).body("") {
                let _ = request.send().await;
            }
        });
    };

    view! {
        <div class="admin-tab">
            <h2>{ "Access" }</h2>

            <h3>{ "Menus" }</h3>
            <form class="inline-form" on:submit=create_menu>
                <input
                    type="text"
                    placeholder="Title"
                    prop:value={move || title.get()}
                    on:input=move |e| set_title.set(event_target_value(&e))
                />
                <input
                    type="text"
                    placeholder="Path"
                    prop:value={move || path.get()}
                    on:input=move |e| set_path.set(event_target_value(&e))
                />
                <button type="submit">{ "Add menu" }</button>
            </form>
            <DataTable headers=vec!["Title", "Path", "Order"] rows=rows on_delete=delete />

            <h3>{ "Assign menu to role" }</h3>
            <form class="inline-form" on:submit=assign>
                <select on:change=move |e| set_role_id.set(event_target_value(&e))>
                    <option value="">{ "Role..." }</option>
                    {move || roles.get().flatten().unwrap_or_default().into_iter().map(|role| {
                        view! { <option value={role.id.to_string()}>{ role.name.clone() }</option> }
                    }).collect::<Vec<_>>()}
                </select>
                <select on:change=move |e| set_menu_id.set(event_target_value(&e))>
                    <option value="">{ "Menu..." }</option>
                    {move || menus.get().flatten().unwrap_or_default().into_iter().map(|menu| {
                        view! { <option value={menu.id.to_string()}>{ menu.title.clone() }</option> }
                    }).collect::<Vec<_>>()}
                </select>
                <button type="submit">{ "Assign" }</button>
            </form>
        </div>
    }
}
