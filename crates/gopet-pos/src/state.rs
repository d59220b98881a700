//! # Cart State
//!
//! Shared ownership of the active cart.
//!
//! ## Thread Safety
//! The cart is wrapped in `Arc<Mutex<T>>` because:
//! 1. Multiple service calls may access/modify the cart
//! 2. Only one call should modify the cart at a time
//! 3. Checkout runs async and must snapshot a consistent view
//!
//! ## Why Not RwLock?
//! Cart operations are quick and most of them write.
//! A RwLock would add complexity with minimal benefit.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use gopet_core::{Cart, CartLine, CartTotals, TaxRate};

/// Shared cart state.
///
/// Clones share the same underlying cart; hand one to the checkout
/// service and another to whatever drives the cart UI.
#[derive(Debug, Clone)]
pub struct CartState {
    cart: Arc<Mutex<Cart>>,
}

impl CartState {
    /// Creates a new empty cart state.
    pub fn new() -> Self {
        CartState {
            cart: Arc::new(Mutex::new(Cart::new())),
        }
    }

    /// Executes a function with read access to the cart.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let totals = cart_state.with_cart(|cart| cart.totals(rate));
    /// ```
    pub fn with_cart<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Cart) -> R,
    {
        let cart = self.cart.lock().expect("Cart mutex poisoned");
        f(&cart)
    }

    /// Executes a function with write access to the cart.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// cart_state.with_cart_mut(|cart| cart.add_line(line))?;
    /// ```
    pub fn with_cart_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Cart) -> R,
    {
        let mut cart = self.cart.lock().expect("Cart mutex poisoned");
        f(&mut cart)
    }
}

impl Default for CartState {
    fn default() -> Self {
        Self::new()
    }
}

/// Cart view returned to the frontend after each mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub lines: Vec<CartLine>,
    pub client_id: Option<String>,
    pub totals: CartTotals,
}

impl CartView {
    /// Builds a view of the cart at the given tax rate.
    pub fn of(cart: &Cart, tax_rate: TaxRate) -> Self {
        CartView {
            lines: cart.lines.clone(),
            client_id: cart.client_id.clone(),
            totals: cart.totals(tax_rate),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gopet_core::{ItemKind, Money};

    #[test]
    fn test_clones_share_the_cart() {
        let state = CartState::new();
        let other = state.clone();

        let line = CartLine::new(
            "svc-bath",
            ItemKind::Service,
            "Bath & Brush",
            Money::from_cents(2500),
            1,
        )
        .unwrap();
        state.with_cart_mut(|c| c.add_line(line)).unwrap();

        assert_eq!(other.with_cart(|c| c.line_count()), 1);
    }

    #[test]
    fn test_cart_view_totals() {
        let state = CartState::new();
        let line = CartLine::new(
            "svc-groom-lg",
            ItemKind::Service,
            "Full Groom - Large Breed",
            Money::from_cents(4599),
            2,
        )
        .unwrap();
        state.with_cart_mut(|c| c.add_line(line)).unwrap();

        let view = state.with_cart(|c| CartView::of(c, TaxRate::from_bps(850)));
        assert_eq!(view.totals.total_cents, 9980);
        assert_eq!(view.lines.len(), 1);
    }
}
