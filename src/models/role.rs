use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Role {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

/// An admin navigation entry. Which roles see which menus is kept in a
/// separate role_menus mapping.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Menu {
    pub id: i64,
    pub title: String,
    pub path: String,
    pub icon: Option<String>,
    pub sort_order: i64,
    pub is_active: String, // 'Y' | 'N'
}
