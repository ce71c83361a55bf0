#![cfg(target_arch = "wasm32")]

use emporium::components::reviews_list::ReviewsList;
use emporium::models::review::Review;
use leptos::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn test_container(id: &str) -> web_sys::HtmlElement {
    let document = web_sys::window().unwrap().document().unwrap();
    let container: web_sys::HtmlElement = document
        .create_element("div")
        .unwrap()
        .dyn_into()
        .unwrap();
    container.set_id(id);
    document.body().unwrap().append_child(&container).unwrap();
    container
}

fn sample_review(id: i64, rating: i64, comment: &str, username: &str) -> Review {
    Review {
        id,
        user_id: 1,
        product_id: 1,
        rating,
        comment: comment.to_string(),
        username: Some(username.to_string()),
        product_name: Some("Walnut Desk".to_string()),
        created_at: "2026-08-01 10:00:00".to_string(),
        updated_at: "2026-08-01 10:00:00".to_string(),
    }
}

#[wasm_bindgen_test]
fn test_reviews_list_renders_reviews() {
    let container = test_container("reviews-test-container");

    mount_to(container.clone(), || {
        view! {
            <ReviewsList reviews=vec![
                sample_review(1, 5, "Sturdy and handsome", "alice"),
                sample_review(2, 3, "Arrived scratched", "bob"),
            ] />
        }
    });

    let text = container.text_content().unwrap_or_default();
    assert!(text.contains("5/5"), "first rating should render");
    assert!(text.contains("Sturdy and handsome"));
    assert!(text.contains("by alice"));
    assert!(text.contains("3/5"), "second rating should render");

    container.remove();
}

#[wasm_bindgen_test]
fn test_reviews_list_empty_state() {
    let container = test_container("reviews-empty-test-container");

    mount_to(container.clone(), || view! { <ReviewsList reviews=Vec::new() /> });

    let text = container.text_content().unwrap_or_default();
    assert!(text.contains("No reviews yet."));

    container.remove();
}
