use bigdecimal::{BigDecimal, RoundingMode};
use uuid::Uuid;

/// Tax applied to the cart subtotal, in percent.
pub const TAX_PERCENT: i32 = 2;

#[derive(Debug, Clone)]
pub struct CartItem {
    pub id: Uuid,
    pub cart_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub is_active: bool,
}

/// One active line of a cart, already joined with its product.
#[derive(Debug, Clone)]
pub struct CartLine {
    pub product_id: Uuid,
    pub product_name: String,
    pub unit_price: BigDecimal,
    pub quantity: i32,
}

#[derive(Debug, Clone)]
pub enum CartLookup {
    Found(Vec<CartLine>),
    NotFound,
}

/// Outcome of a decrement on a cart line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemChange {
    Decremented { remaining: i32 },
    Removed,
}

#[derive(Debug, Clone)]
pub struct CartLineView {
    pub product_id: Uuid,
    pub product_name: String,
    pub unit_price: BigDecimal,
    pub quantity: i32,
    pub subtotal: BigDecimal,
}

#[derive(Debug, Clone)]
pub struct CartView {
    pub total: BigDecimal,
    pub quantity: i64,
    pub tax: BigDecimal,
    pub grand_total: BigDecimal,
    pub items: Vec<CartLineView>,
}

impl CartView {
    pub fn empty() -> Self {
        Self {
            total: zero_amount(),
            quantity: 0,
            tax: zero_amount(),
            grand_total: zero_amount(),
            items: vec![],
        }
    }
}

/// Zero with cent scale, so it renders as "0.00".
fn zero_amount() -> BigDecimal {
    BigDecimal::new(0.into(), 2)
}

fn tax_rate() -> BigDecimal {
    BigDecimal::new(TAX_PERCENT.into(), 2)
}

/// Compute totals for a cart lookup. A missing cart is an empty cart.
pub fn summarize(lookup: CartLookup) -> CartView {
    let lines = match lookup {
        CartLookup::Found(lines) => lines,
        CartLookup::NotFound => return CartView::empty(),
    };

    let mut total = zero_amount();
    let mut quantity: i64 = 0;
    let mut items = Vec::with_capacity(lines.len());

    for line in lines {
        let subtotal = &line.unit_price * BigDecimal::from(line.quantity);
        total += &subtotal;
        quantity += i64::from(line.quantity);
        items.push(CartLineView {
            product_id: line.product_id,
            product_name: line.product_name,
            unit_price: line.unit_price,
            quantity: line.quantity,
            subtotal,
        });
    }

    // Half a cent rounds up.
    let tax = (&total * tax_rate()).with_scale_round(2, RoundingMode::HalfUp);
    let grand_total = &total + &tax;

    CartView {
        total,
        quantity,
        tax,
        grand_total,
        items,
    }
}
