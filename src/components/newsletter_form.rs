use leptos::*;
use leptos_dom::ev::SubmitEvent;
use serde_json::json;

/// Footer signup. Subscribing an address twice is fine; the server treats
/// it as a re-subscribe.
#[component]
pub fn NewsletterForm() -> impl IntoView {
    let (email, set_email) = create_signal(String::new());
    let (status, set_status) = create_signal(Option::<String>::None);

    let handle_submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        let body = json!({ "email": email.get() });
        spawn_local(async move {
            let request = gloo_net::http::Request::post("/api/newsletter/subscribe")
                .header("Content-Type", "application/json")
                .body(body.to_string());
            let Ok(request) = request else { return };
            match request.send().await {
                Ok(response) if response.status() == 200 => {
                    set_email.set(String::new());
                    set_status.set(Some("Thanks for subscribing!".into()));
                }
                Ok(response) => {
                    let message = response
                        .json::<serde_json::Value>()
                        .await
                        .ok()
                        .and_then(|v| v["message"].as_str().map(|s| s.to_string()))
                        .unwrap_or_else(|| "Subscription failed".into());
                    set_status.set(Some(message));
                }
                Err(_) => set_status.set(Some("Could not reach the server".into())),
            }
        });
    };

    view! {
        <form class="newsletter" on:submit=handle_submit>
            <h3>{ "Stay in the loop" }</h3>
            <input
                type="email"
                placeholder="you@example.com"
                prop:value={move || email.get()}
                on:input=move |e| set_email.set(event_target_value(&e))
            />
            <button type="submit">{ "Subscribe" }</button>
            {move || status.get().map(|message| view! { <p>{ message }</p> })}
        </form>
    }
}
