use crate::models::order::Order;
use crate::utils::format::format_price;
use leptos::*;
use serde_json::json;

/// Which moves the back office offers for an order in a given state.
fn next_statuses(status: &str) -> &'static [&'static str] {
    match status {
        "Pending" => &["Cancelled"],
        "Paid" => &["Shipped"],
        "Shipped" => &["Delivered"],
        _ => &[],
    }
}

#[component]
pub fn OrdersTab() -> impl IntoView {
    let (version, set_version) = create_signal(0u32);
    let orders = create_local_resource(
        move || version.get(),
        |_| async move {
            let response = gloo_net::http::Request::get("/api/orders").send().await.ok()?;
            if response.status() != 200 {
                return None;
            }
            response.json::<Vec<Order>>().await.ok()
        },
    );

    let set_status = move |order_id: i64, status: &'static str| {
        spawn_local(async move {
            let request = gloo_net::http::Request::put(&format!("/api/orders/{}/status", order_id))
                .header("Content-Type", "application/json")
                .body(json!({ "status": status }).to_string());
            if let Ok(request) = request {
                let _ = request.send().await;
            }
            set_version.update(|v| *v += 1);
        });
    };

    view! {
        <div class="admin-tab">
            <h2>{ "Orders" }</h2>
            <table class="data-table">
                <thead>
                    <tr>
                        <th>{ "Reference" }</th><th>{ "Customer" }</th><th>{ "Items" }</th>
                        <th>{ "Total" }</th><th>{ "Status" }</th><th>{ "Actions" }</th>
                    </tr>
                </thead>
                <tbody>
                    {move || orders.get().flatten().unwrap_or_default().into_iter().map(|order| {
                        let order_id = order.id;
                        let items = order.items.iter()
                            .map(|item| format!(
                                "{} x{}",
                                item.product_name.clone().unwrap_or_default(),
                                item.quantity,
                            ))
                            .collect::<Vec<_>>()
                            .join(", ");
                        view! {
                            <tr>
                                <td>{ order.reference.clone() }</td>
                                <td>{ order.username.clone().unwrap_or_default() }</td>
                                <td>{ items }</td>
                                <td>{ format_price(order.total_cents) }</td>
                                <td>{ order.status.clone() }</td>
                                <td class="actions">
                                    {next_statuses(&order.status).iter().map(|&next| view! {
                                        <button on:click=move |_| set_status(order_id, next)>
                                            { next }
                                        </button>
                                    }).collect::<Vec<_>>()}
                                </td>
                            </tr>
                        }
                    }).collect::<Vec<_>>()}
                </tbody>
            </table>
        </div>
    }
}
