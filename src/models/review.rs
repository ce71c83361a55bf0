use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Review {
    pub id: i64,
    pub user_id: i64,          // Author of the review
    pub product_id: i64,       // Product the review is attached to
    pub rating: i64,           // 1..=5
    pub comment: String,
    pub username: Option<String>,     // Joined for display
    pub product_name: Option<String>, // Joined for display
    pub created_at: String,
    pub updated_at: String,
}
