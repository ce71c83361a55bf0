use leptos::*;
use leptos_dom::ev::SubmitEvent;
use serde_json::json;

/// Review submission form for a product page. The server enforces the
/// one-review-per-product rule; this form just reports what it said.
#[component]
pub fn ReviewForm(
    product_id: i64,
    user_id: i64,
    on_submitted: impl Fn() + Clone + 'static,
) -> impl IntoView {
    let (rating, set_rating) = create_signal(5i64);
    let (comment, set_comment) = create_signal(String::new());
    let (error, set_error) = create_signal(Option::<String>::None);

    let handle_submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        let on_submitted = on_submitted.clone();
        let body = json!({
            "user_id": user_id,
            "product_id": product_id,
            "rating": rating.get(),
            "comment": comment.get(),
        });
        spawn_local(async move {
            let request = gloo_net::http::Request::post("/api/reviews")
                .header("Content-Type", "application/json")
                .body(body.to_string());
            let Ok(request) = request else { return };
            match request.send().await {
                Ok(response) if response.status() == 201 => {
                    set_comment.set(String::new());
                    set_rating.set(5);
                    set_error.set(None);
                    on_submitted();
                }
                Ok(response) => {
                    let message = response
                        .json::<serde_json::Value>()
                        .await
                        .ok()
                        .and_then(|v| v["message"].as_str().map(|s| s.to_string()))
                        .unwrap_or_else(|| "Could not submit review".into());
                    set_error.set(Some(message));
                }
                Err(_) => set_error.set(Some("Could not reach the server".into())),
            }
        });
    };

    view! {
        <form class="review-form" on:submit=handle_submit>
            <h3>{ "Write a Review" }</h3>
            <label>{ "Rating" }</label>
            <select on:change=move |e| {
                set_rating.set(event_target_value(&e).parse::<i64>().unwrap_or(5))
            }>
                {(1..=5).rev().map(|n| view! {
                    <option value={n.to_string()} selected={n == 5}>
                        { format!("{} / 5", n) }
                    </option>
                }).collect::<Vec<_>>()}
            </select>
            <textarea
                placeholder="What did you think?"
                prop:value={move || comment.get()}
                on:input=move |e| set_comment.set(event_target_value(&e))
            />
            {move || error.get().map(|message| view! { <p class="error">{ message }</p> })}
            <button type="submit">{ "Submit Review" }</button>
        </form>
    }
}
