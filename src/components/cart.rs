use crate::models::product::Product;
use crate::utils::format::format_price;
use leptos::*;
use serde_json::json;

/// A line in the client-side cart. The server re-prices everything at
/// checkout, so this only needs enough to render.
#[derive(Clone, Debug, PartialEq)]
pub struct CartLine {
    pub product: Product,
    pub quantity: i64,
}

#[component]
pub fn CartView(cart: RwSignal<Vec<CartLine>>) -> impl IntoView {
    let (status, set_status) = create_signal(Option::<String>::None);

    let total = move || {
        cart.get()
            .iter()
            .map(|line| line.product.price_cents * line.quantity)
            .sum::<i64>()
    };

    let remove = move |product_id: i64| {
        cart.update(|lines| lines.retain(|line| line.product.id != product_id));
    };

    let checkout = move |_| {
        let lines: Vec<serde_json::Value> = cart
            .get_untracked()
            .iter()
            .map(|line| json!({ "product_id": line.product.id, "quantity": line.quantity }))
            .collect();
        spawn_local(async move {
            let request = gloo_net::http::Request::post("/api/orders")
                .header("Content-Type", "application/json")
                .body(json!({ "lines": lines }).to_string());
            let Ok(request) = request else { return };
            match request.send().await {
                Ok(response) if response.status() == 201 => {
                    cart.set(Vec::new());
                    set_status.set(Some("Order placed. Thank you!".into()));
                }
                Ok(response) if response.status() == 401 => {
                    set_status.set(Some("Log in to place an order.".into()));
                }
                Ok(response) => {
                    let message = response
                        .json::<serde_json::Value>()
                        .await
                        .ok()
                        .and_then(|v| v["message"].as_str().map(|s| s.to_string()))
                        .unwrap_or_else(|| "Could not place order".into());
                    set_status.set(Some(message));
                }
                Err(_) => set_status.set(Some("Could not reach the server".into())),
            }
        });
    };

    view! {
        <div class="cart">
            <h2>{ "Your Cart" }</h2>
            {move || if cart.get().is_empty() {
                view! { <p>{ "The cart is empty." }</p> }.into_view()
            } else {
                view! {
                    <div>
                        <ul>
                            {cart.get().into_iter().map(|line| {
                                let product_id = line.product.id;
                                view! {
                                    <li>
                                        { format!(
                                            "{} x{} - {}",
                                            line.product.name,
                                            line.quantity,
                                            format_price(line.product.price_cents * line.quantity),
                                        ) }
                                        <button on:click=move |_| remove(product_id)>
                                            { "Remove" }
                                        </button>
                                    </li>
                                }
                            }).collect::<Vec<_>>()}
                        </ul>
                        <p class="total">{ move || format!("Total: {}", format_price(total())) }</p>
                        <button on:click=checkout>{ "Place Order" }</button>
                    </div>
                }.into_view()
            }}
            {move || status.get().map(|message| view! { <p class="status">{ message }</p> })}
        </div>
    }
}

/// The customer's order history, with payment and cancellation for orders
/// that are still pending.
#[component]
pub fn OrdersView() -> impl IntoView {
    use crate::models::order::Order;

    let (version, set_version) = create_signal(0u32);
    let orders = create_local_resource(
        move || version.get(),
        |_| async move {
            let response = gloo_net::http::Request::get("/api/orders/mine").send().await.ok()?;
            if response.status() != 200 {
                return None;
            }
            response.json::<Vec<Order>>().await.ok()
        },
    );

    let pay = move |order_id: i64| {
        spawn_local(async move {
            let request = gloo_net::http::Request::post(&format!("/api/orders/{}/pay", order_id))
                .header("Content-Type", "application/json")
                .body(json!({ "method": "card" }).to_string());
            if let Ok(request) = request {
                let _ = request.send().await;
            }
            set_version.update(|v| *v += 1);
        });
    };

    let cancel = move |order_id: i64| {
        spawn_local(async move {
            let request = gloo_net::http::Request::put(&format!("/api/orders/{}/status", order_id))
                .header("Content-Type", "application/json")
                .body(json!({ "status": "Cancelled" }).to_string());
            if let Ok(request) = request {
                let _ = request.send().await;
            }
            set_version.update(|v| *v += 1);
        });
    };

    view! {
        <div class="orders">
            <h2>{ "My Orders" }</h2>
            {move || match orders.get().flatten() {
                Some(orders) if !orders.is_empty() => orders.into_iter().map(|order| {
                    let order_id = order.id;
                    let pending = order.status == "Pending";
                    view! {
                        <div class="order">
                            <strong>{ format!("#{}", order.reference) }</strong>
                            <span>{ order.status.clone() }</span>
                            <span>{ format_price(order.total_cents) }</span>
                            <span>{ order.created_at.clone() }</span>
                            <ul>
                                {order.items.iter().map(|item| view! {
                                    <li>
                                        { format!(
                                            "{} x{}",
                                            item.product_name.clone().unwrap_or_default(),
                                            item.quantity,
                                        ) }
                                    </li>
                                }).collect::<Vec<_>>()}
                            </ul>
                            {pending.then(|| view! {
                                <span class="order-actions">
                                    <button on:click=move |_| pay(order_id)>{ "Pay" }</button>
                                    <button class="danger" on:click=move |_| cancel(order_id)>
                                        { "Cancel" }
                                    </button>
                                </span>
                            })}
                        </div>
                    }
                }).collect::<Vec<_>>().into_view(),
                _ => view! { <p>{ "No orders yet." }</p> }.into_view(),
            }}
        </div>
    }
}
