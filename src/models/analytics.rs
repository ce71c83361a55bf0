use serde::{Deserialize, Serialize};

/// Headline numbers for the admin dashboard.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct DashboardSummary {
    pub revenue_cents: i64,
    pub order_count: i64,
    pub customer_count: i64,
    pub product_count: i64,
    pub review_count: i64,
    pub subscriber_count: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct DailySales {
    pub day: String, // YYYY-MM-DD
    pub orders: i64,
    pub revenue_cents: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TopProduct {
    pub product_id: i64,
    pub name: String,
    pub units_sold: i64,
    pub revenue_cents: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ProductRating {
    pub product_id: i64,
    pub name: String,
    pub review_count: i64,
    pub avg_rating: f64,
}
