use leptos::*;
use leptos_dom::ev::SubmitEvent;
use serde_json::json;

async fn post_json(url: &str, body: serde_json::Value) -> Result<(u16, serde_json::Value), ()> {
    let request = gloo_net::http::Request::post(url)
        .header("Content-Type", "application/json")
        .body(body.to_string())
        .map_err(|_| ())?;
    let response = request.send().await.map_err(|_| ())?;
    let status = response.status();
    let value = response.json::<serde_json::Value>().await.unwrap_or_default();
    Ok((status, value))
}

fn message_of(value: &serde_json::Value, fallback: &str) -> String {
    value["message"]
        .as_str()
        .map(|s| s.to_string())
        .unwrap_or_else(|| fallback.to_string())
}

/// Login and registration on one page, toggled by a tab.
#[component]
pub fn AuthForms() -> impl IntoView {
    let (registering, set_registering) = create_signal(false);
    let (username, set_username) = create_signal(String::new());
    let (email, set_email) = create_signal(String::new());
    let (password, set_password) = create_signal(String::new());
    let (status, set_status) = create_signal(Option::<String>::None);

    let handle_submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        let registering = registering.get();
        spawn_local(async move {
            if registering {
                let body = json!({
                    "username": username.get_untracked(),
                    "email": email.get_untracked(),
                    "password": password.get_untracked(),
                });
                match post_json("/api/auth/register", body).await {
                    Ok((201, _)) => {
                        set_registering.set(false);
                        set_status.set(Some("Account created. You can log in now.".into()));
                    }
                    Ok((_, value)) => set_status.set(Some(message_of(&value, "Registration failed"))),
                    Err(_) => set_status.set(Some("Could not reach the server".into())),
                }
            } else {
                let body = json!({
                    "username": username.get_untracked(),
                    "password": password.get_untracked(),
                });
                match post_json("/api/auth/login", body).await {
                    Ok((200, _)) => {
                        let _ = window().location().set_href("/");
                    }
                    Ok((_, value)) => set_status.set(Some(message_of(&value, "Login failed"))),
                    Err(_) => set_status.set(Some("Could not reach the server".into())),
                }
            }
        });
    };

    view! {
        <div class="auth-forms">
            <div class="tabs">
                <button
                    class:active={move || !registering.get()}
                    on:click=move |_| set_registering.set(false)
                >{ "Log in" }</button>
                <button
                    class:active={move || registering.get()}
                    on:click=move |_| set_registering.set(true)
                >{ "Register" }</button>
            </div>
            <form on:submit=handle_submit>
                <input
                    type="text"
                    placeholder="Username"
                    prop:value={move || username.get()}
                    on:input=move |e| set_username.set(event_target_value(&e))
                />
                {move || registering.get().then(|| view! {
                    <input
                        type="email"
                        placeholder="Email"
                        prop:value={move || email.get()}
                        on:input=move |e| set_email.set(event_target_value(&e))
                    />
                })}
                <input
                    type="password"
                    placeholder="Password"
                    prop:value={move || password.get()}
                    on:input=move |e| set_password.set(event_target_value(&e))
                />
                <button type="submit">
                    {move || if registering.get() { "Create account" } else { "Log in" }}
                </button>
            </form>
            {move || status.get().map(|message| view! { <p class="status">{ message }</p> })}
        </div>
    }
}
