/// Main application entry point for Emporium.
/// Wires the storefront pages, the cart, and the admin panel into the
/// router.
use crate::components::admin::panel::AdminPanel;
use crate::components::auth_forms::AuthForms;
use crate::components::banner_carousel::BannerCarousel;
use crate::components::blog::{BlogList, BlogPostView};
use crate::components::cart::{CartLine, CartView, OrdersView};
use crate::components::navbar::Navbar;
use crate::components::newsletter_form::NewsletterForm;
use crate::components::product_detail::ProductDetail;
use crate::components::products_list::ProductsList;
use crate::models::product::Product;
use leptos::*;
use leptos_meta::*;
use leptos_router::*;

#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    // The cart lives client-side; the server re-validates at checkout.
    let cart = create_rw_signal(Vec::<CartLine>::new());
    let cart_count = Signal::derive(move || {
        cart.get().iter().map(|line| line.quantity as usize).sum()
    });
    let add_to_cart = Callback::new(move |product: Product| {
        cart.update(|lines| {
            match lines.iter_mut().find(|line| line.product.id == product.id) {
                Some(line) => line.quantity += 1,
                None => lines.push(CartLine { product, quantity: 1 }),
            }
        });
    });

    view! {
        <Stylesheet id="leptos" href="/pkg/emporium.css" />
        <Title text="Emporium" />
        <Router>
            <Navbar cart_count=cart_count />
            <main>
                <Routes>
                    <Route path="/" view=HomePage />
                    <Route path="/products" view=ProductsList />
                    <Route
                        path="/products/:slug"
                        view=move || view! { <ProductDetail on_add_to_cart=add_to_cart /> }
                    />
                    <Route path="/blog" view=BlogList />
                    <Route path="/blog/:slug" view=BlogPostView />
                    <Route path="/cart" view=move || view! { <CartView cart=cart /> } />
                    <Route path="/orders" view=OrdersView />
                    <Route path="/login" view=AuthForms />
                    <Route path="/admin" view=AdminPanel />
                    <Route path="/admin/:tab" view=AdminPanel />
                </Routes>
            </main>
            <footer>
                <NewsletterForm />
            </footer>
        </Router>
    }
}

#[component]
fn HomePage() -> impl IntoView {
    view! {
        <div class="home">
            <BannerCarousel />
            <ProductsList />
        </div>
    }
}
