use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub slug: String,           // URL-friendly identifier, unique
    pub description: String,
    pub price_cents: i64,       // Prices stored in cents to avoid float money
    pub stock: i64,
    pub category_id: Option<i64>,
    pub category_name: Option<String>, // Joined for display
    pub image_url: Option<String>,
    pub is_active: String,      // 'Y' | 'N'
    pub created_at: String,
    pub updated_at: String,
}
