use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub body: String,
    pub author_id: i64,
    pub author_name: Option<String>, // Joined for display
    pub published: String,           // 'Y' | 'N'
    pub created_at: String,
    pub updated_at: String,
}
