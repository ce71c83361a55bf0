use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Banner {
    pub id: i64,
    pub title: String,
    pub image_url: String,
    pub link_url: Option<String>, // Where the banner points, if anywhere
    pub sort_order: i64,
    pub is_active: String, // 'Y' | 'N'
}
