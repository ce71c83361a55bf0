use crate::models::analytics::{DailySales, DashboardSummary, TopProduct};
use crate::models::order::Order;
use crate::utils::format::format_price;
use leptos::*;

async fn fetch_json<T: serde::de::DeserializeOwned>(url: &str) -> Option<T> {
    let response = gloo_net::http::Request::get(url).send().await.ok()?;
    if response.status() != 200 {
        return None;
    }
    response.json::<T>().await.ok()
}

/// Analytics landing page: headline cards, a 30-day sales table, best
/// sellers, and the latest orders.
#[component]
pub fn Dashboard() -> impl IntoView {
    let summary = create_local_resource(
        || (),
        |_| async move { fetch_json::<DashboardSummary>("/api/analytics/summary").await },
    );
    let sales = create_local_resource(
        || (),
        |_| async move { fetch_json::<Vec<DailySales>>("/api/analytics/sales-by-day?days=30").await },
    );
    let top = create_local_resource(
        || (),
        |_| async move { fetch_json::<Vec<TopProduct>>("/api/analytics/top-products?limit=5").await },
    );
    let recent = create_local_resource(
        || (),
        |_| async move { fetch_json::<Vec<Order>>("/api/analytics/recent-orders?limit=10").await },
    );

    view! {
        <div class="dashboard">
            <h2>{ "Dashboard" }</h2>
            {move || summary.get().flatten().map(|s| view! {
                <div class="stat-cards">
                    <div class="stat-card">
                        <span class="label">{ "Revenue" }</span>
                        <span class="value">{ format_price(s.revenue_cents) }</span>
                    </div>
                    <div class="stat-card">
                        <span class="label">{ "Orders" }</span>
                        <span class="value">{ s.order_count }</span>
                    </div>
                    <div class="stat-card">
                        <span class="label">{ "Customers" }</span>
                        <span class="value">{ s.customer_count }</span>
                    </div>
                    <div class="stat-card">
                        <span class="label">{ "Products" }</span>
                        <span class="value">{ s.product_count }</span>
                    </div>
                    <div class="stat-card">
                        <span class="label">{ "Reviews" }</span>
                        <span class="value">{ s.review_count }</span>
                    </div>
                    <div class="stat-card">
                        <span class="label">{ "Subscribers" }</span>
                        <span class="value">{ s.subscriber_count }</span>
                    </div>
                </div>
            })}

            <h3>{ "Sales, last 30 days" }</h3>
            <table class="data-table">
                <thead>
                    <tr><th>{ "Day" }</th><th>{ "Orders" }</th><th>{ "Revenue" }</th></tr>
                </thead>
                <tbody>
                    {move || sales.get().flatten().unwrap_or_default().into_iter().map(|day| {
                        view! {
                            <tr>
                                <td>{ day.day.clone() }</td>
                                <td>{ day.orders }</td>
                                <td>{ format_price(day.revenue_cents) }</td>
                            </tr>
                        }
                    }).collect::<Vec<_>>()}
                </tbody>
            </table>

            <h3>{ "Best sellers" }</h3>
            <table class="data-table">
                <thead>
                    <tr><th>{ "Product" }</th><th>{ "Units" }</th><th>{ "Revenue" }</th></tr>
                </thead>
                <tbody>
                    {move || top.get().flatten().unwrap_or_default().into_iter().map(|product| {
                        view! {
                            <tr>
                                <td>{ product.name.clone() }</td>
                                <td>{ product.units_sold }</td>
                                <td>{ format_price(product.revenue_cents) }</td>
                            </tr>
                        }
                    }).collect::<Vec<_>>()}
                </tbody>
            </table>

            <h3>{ "Recent orders" }</h3>
            <table class="data-table">
                <thead>
                    <tr>
                        <th>{ "Reference" }</th><th>{ "Customer" }</th>
                        <th>{ "Status" }</th><th>{ "Total" }</th><th>{ "Placed" }</th>
                    </tr>
                </thead>
                <tbody>
                    {move || recent.get().flatten().unwrap_or_default().into_iter().map(|order| {
                        view! {
                            <tr>
                                <td>{ order.reference.clone() }</td>
                                <td>{ order.username.clone().unwrap_or_default() }</td>
                                <td>{ order.status.clone() }</td>
                                <td>{ format_price(order.total_cents) }</td>
                                <td>{ order.created_at.clone() }</td>
                            </tr>
                        }
                    }).collect::<Vec<_>>()}
                </tbody>
            </table>
        </div>
    }
}
