use crate::models::review::Review;
use leptos::*;

#[component]
pub fn ReviewsList(reviews: Vec<Review>) -> impl IntoView {
    view! {
        <div class="reviews">
            <h3>{ "Reviews" }</h3>
            {if reviews.is_empty() {
                view! { <p>{ "No reviews yet." }</p> }.into_view()
            } else {
                view! {
                    <ul>
                        {reviews.into_iter().map(|review| {
                            view! {
                                <li>
                                    <strong>{ format!("{}/5", review.rating) }</strong>
                                    { " - " }
                                    { review.comment.clone() }
                                    <span class="byline">
                                        { format!(
                                            "by {} on {}",
                                            review.username.clone().unwrap_or_else(|| "anonymous".into()),
                                            review.created_at,
                                        ) }
                                    </span>
                                </li>
                            }
                        }).collect::<Vec<_>>()}
                    </ul>
                }.into_view()
            }}
        </div>
    }
}
