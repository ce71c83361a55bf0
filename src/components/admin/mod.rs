pub mod access_tab;
pub mod catalog_tabs;
pub mod content_tabs;
pub mod dashboard;
pub mod data_table;
pub mod orders_tab;
pub mod panel;
pub mod products_tab;
pub mod reviews_tab;
