//! Plain-text cart rendering.

use std::fmt::Write;

use rocket_cart_core::{Cart, CurrencyCode};

const TITLE_WIDTH: usize = 36;

/// Render the cart as a table followed by a summary line.
pub fn cart_table(cart: &Cart, currency: CurrencyCode) -> String {
    if cart.is_empty() {
        return "Your cart is empty".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>5}  {:<TITLE_WIDTH$}  {:>5}  {:>12}  {:>12}",
        "ID", "PRODUCT", "QTY", "PRICE", "SUBTOTAL"
    );

    for product in cart {
        let _ = writeln!(
            out,
            "{:>5}  {:<TITLE_WIDTH$}  {:>5}  {:>12}  {:>12}",
            product.id.as_i32(),
            truncate(&product.title, TITLE_WIDTH),
            product.amount,
            product.price.display(currency),
            product.line_total().display(currency),
        );
    }

    let _ = write!(
        out,
        "\n{} item(s), total {}",
        cart.item_count(),
        cart.subtotal().display(currency)
    );
    out
}

/// Shorten `s` to at most `width` characters, marking the cut with "...".
fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return s.to_string();
    }
    let kept: String = s.chars().take(width.saturating_sub(3)).collect();
    format!("{kept}...")
}
