use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Subscriber {
    pub id: i64,
    pub email: String,
    pub subscribed_at: String,
    pub is_active: String, // 'Y' | 'N'
}
