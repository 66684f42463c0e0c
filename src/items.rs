//! Items

use rust_decimal::Decimal;

/// A priced line on the form: a unit price and how many units were bought.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LineItem {
    price: Decimal,
    quantity: u32,
}

impl LineItem {
    /// Creates a new line item with the given unit price and quantity
    pub fn new(price: Decimal, quantity: u32) -> Self {
        Self { price, quantity }
    }

    /// Returns the unit price of the item
    pub fn price(&self) -> Decimal {
        self.price
    }

    /// Returns the number of units
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Returns `price * quantity`, or `None` if the product overflows.
    pub fn value(&self) -> Option<Decimal> {
        self.price.checked_mul(Decimal::from(self.quantity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_multiplies_price_by_quantity() {
        let item = LineItem::new(Decimal::new(1250, 2), 4);

        assert_eq!(item.value(), Some(Decimal::new(50, 0)));
    }

    #[test]
    fn value_of_zero_quantity_is_zero() {
        let item = LineItem::new(Decimal::new(999, 2), 0);

        assert_eq!(item.value(), Some(Decimal::ZERO));
    }

    #[test]
    fn value_overflow_is_none() {
        let item = LineItem::new(Decimal::MAX, 2);

        assert_eq!(item.value(), None);
    }
}
