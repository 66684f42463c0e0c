//! Pricing

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::items::LineItem;

/// Errors that can occur while calculating totals.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PricingError {
    /// The total price is zero, so a discount percentage cannot be derived from it.
    #[error("total price is zero; cannot express the discount as a percentage")]
    ZeroTotalPrice,

    /// Decimal arithmetic overflowed.
    #[error("arithmetic overflow while calculating totals")]
    Overflow,
}

/// The overall price and discount to be reconciled against the line items.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Totals {
    total_price: Decimal,
    total_discount: Decimal,
}

impl Totals {
    /// Creates a new set of totals
    pub fn new(total_price: Decimal, total_discount: Decimal) -> Self {
        Self {
            total_price,
            total_discount,
        }
    }

    /// Returns the overall price
    pub fn total_price(&self) -> Decimal {
        self.total_price
    }

    /// Returns the overall discount
    pub fn total_discount(&self) -> Decimal {
        self.total_discount
    }

    /// The overall discount as a fraction of the overall price.
    ///
    /// # Errors
    ///
    /// - [`PricingError::ZeroTotalPrice`]: the total price is zero.
    /// - [`PricingError::Overflow`]: the division overflowed.
    pub fn discount_rate(&self) -> Result<Percentage, PricingError> {
        if self.total_price.is_zero() {
            return Err(PricingError::ZeroTotalPrice);
        }

        let rate = self
            .total_discount
            .checked_div(self.total_price)
            .ok_or(PricingError::Overflow)?;

        Ok(Percentage::from(rate))
    }

    /// `total_price - total_discount`, the part of the price not carried by line items.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::Overflow`] if the subtraction overflows.
    pub fn net_price(&self) -> Result<Decimal, PricingError> {
        self.total_price
            .checked_sub(self.total_discount)
            .ok_or(PricingError::Overflow)
    }
}

/// Calculates the combined value (`price * quantity`) of a list of items.
///
/// An empty list is worth zero.
///
/// # Errors
///
/// Returns [`PricingError::Overflow`] if any product or the running sum overflows.
pub fn total_item_value(items: &[LineItem]) -> Result<Decimal, PricingError> {
    items.iter().try_fold(Decimal::ZERO, |acc, item| {
        item.value()
            .and_then(|value| acc.checked_add(value))
            .ok_or(PricingError::Overflow)
    })
}
