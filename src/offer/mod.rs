pub mod drafter;

use log::debug;

use crate::config::discounts::DiscountTable;
use crate::error::{ HaggleError, Result };

pub use drafter::{ DraftRequest, MessageDrafter, TemplateDrafter };

/// Largest price any operation accepts: one trillion dollars.
pub const MAX_PRICE: f64 = 1_000_000_000_000.0;

/// Suggested counter-offer: `round(price * (1 - rate))` with the rate taken
/// from `table`. Always within `(0, price]` for a positive price; 0 for 0.
pub fn calculate_counter_offer(
    original_price: f64,
    platform: &str,
    category: &str,
    table: &DiscountTable
) -> Result<f64> {
    if !original_price.is_finite() {
        return Err(HaggleError::InvalidInput(format!("price must be a finite number, got {}", original_price)));
    }
    if original_price < 0.0 {
        return Err(HaggleError::InvalidInput(format!("price must not be negative, got {}", original_price)));
    }
    if original_price > MAX_PRICE {
        return Err(HaggleError::InvalidInput(format!("price must not exceed {}, got {}", MAX_PRICE, original_price)));
    }
    if original_price == 0.0 {
        return Ok(0.0);
    }

    let rate = table.rate_for(platform, category);
    let offer = (original_price * (1.0 - rate)).round().min(original_price);
    let offer = if offer > 0.0 { offer } else { original_price };
    debug!(
        "Counter-offer for {} ({} on {}): rate {:.2} -> {}",
        original_price,
        category,
        platform,
        rate,
        offer
    );
    Ok(offer)
}
