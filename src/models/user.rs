use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role_id: i64,
    pub role_name: Option<String>, // Joined for display
    pub is_active: String,         // 'Y' | 'N'
    pub created_at: String,
    pub updated_at: String,
}

/// What the client learns about the logged-in session.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SessionUser {
    pub id: i64,
    pub username: String,
    pub role: String,
}
