pub mod admin;
pub mod auth_forms;
pub mod banner_carousel;
pub mod blog;
pub mod cart;
pub mod navbar;
pub mod newsletter_form;
pub mod product_detail;
pub mod products_list;
pub mod review_form;
pub mod reviews_list;
