use crate::components::admin::data_table::{DataTable, TableRow};
use crate::models::review::Review;
use leptos::*;
use serde::Deserialize;

#[derive(Deserialize)]
struct ReviewsPayload {
    #[allow(dead_code)]
    message: String,
    reviews: Vec<Review>,
}

/// Review moderation: every active review across the store, with delete
/// (soft) as the moderation action.
#[component]
pub fn ReviewsTab() -> impl IntoView {
    let (version, set_version) = create_signal(0u32);
    let reviews = create_local_resource(
        move || version.get(),
        |_| async move {
            gloo_net::http::Request::get("/api/reviews")
                .send()
                .await
                .ok()?
                .json::<ReviewsPayload>()
                .await
                .ok()
                .map(|payload| payload.reviews)
        },
    );

    let rows = Signal::derive(move || {
        reviews
            .get()
            .flatten()
            .unwrap_or_default()
            .into_iter()
            .map(|r| TableRow {
                id: r.id,
                cells: vec![
                    r.product_name.clone().unwrap_or_default(),
                    r.username.clone().unwrap_or_default(),
                    format!("{}/5", r.rating),
                    r.comment.clone(),
                    r.created_at.clone(),
                ],
            })
            .collect::<Vec<_>>()
    });

    let delete = Callback::new(move |id: i64| {
        spawn_local(async move {
            let _ = gloo_net::http::Request::delete(&format!("/api/reviews/{}", id))
                .send()
                .await;
            set_version.update(|v| *v += 1);
        });
    });

    view! {
        <div class="admin-tab">
            <h2>{ "Reviews" }</h2>
            <DataTable
                headers=vec!["Product", "User", "Rating", "Comment", "Posted"]
                rows=rows
                on_delete=delete
            />
        </div>
    }
}
