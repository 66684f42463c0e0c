//! Form
//!
//! Holds the raw text a user has typed into the calculator, keeps the list of
//! item rows, and turns that text into typed totals and line items.

use std::{fmt, str::FromStr};

use rust_decimal::{Decimal, prelude::ToPrimitive};
use thiserror::Error;
use tracing::debug;

use crate::{
    allocation::{Allocation, AllocationError, allocate},
    items::LineItem,
    pricing::Totals,
};

/// Identifies a single input field on the form.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Field {
    /// The overall price
    TotalPrice,

    /// The overall discount
    TotalDiscount,

    /// The unit price of the item row at this index
    ItemPrice(usize),

    /// The quantity of the item row at this index
    ItemQuantity(usize),
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::TotalPrice => write!(f, "total price"),
            Field::TotalDiscount => write!(f, "total discount"),
            Field::ItemPrice(idx) => write!(f, "price for item {}", idx + 1),
            Field::ItemQuantity(idx) => write!(f, "quantity for item {}", idx + 1),
        }
    }
}

/// Errors raised while editing or evaluating the form.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    /// A field's text is not a valid number for that field.
    #[error("invalid input for {field}: {text:?}")]
    InvalidInput {
        /// The offending field
        field: Field,
        /// The text that failed to parse
        text: String,
    },

    /// The only remaining item row cannot be removed.
    #[error("the form must keep at least one item")]
    LastItem,

    /// No item row exists at the given index.
    #[error("no item at index {0}")]
    NoSuchItem(usize),

    /// Errors bubbled up from the allocation.
    #[error(transparent)]
    Allocation(#[from] AllocationError),
}

/// Raw text for one item row.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ItemRow {
    /// Unit price text
    pub price: String,

    /// Quantity text
    pub quantity: String,
}

impl ItemRow {
    /// Create a row from price and quantity text
    pub fn new(price: impl Into<String>, quantity: impl Into<String>) -> Self {
        Self {
            price: price.into(),
            quantity: quantity.into(),
        }
    }
}

/// The calculator form: two totals and an ordered list of item rows.
///
/// A form always holds at least one item row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PricingForm {
    total_price: String,
    total_discount: String,
    items: Vec<ItemRow>,
}

impl Default for PricingForm {
    fn default() -> Self {
        Self {
            total_price: String::new(),
            total_discount: String::new(),
            items: vec![ItemRow::default()],
        }
    }
}

impl PricingForm {
    /// Create an empty form with a single blank item row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a form from existing text. An empty row list gets one blank row.
    pub fn with_items(
        total_price: impl Into<String>,
        total_discount: impl Into<String>,
        items: impl Into<Vec<ItemRow>>,
    ) -> Self {
        let mut items = items.into();

        if items.is_empty() {
            items.push(ItemRow::default());
        }

        Self {
            total_price: total_price.into(),
            total_discount: total_discount.into(),
            items,
        }
    }

    /// Total price text
    pub fn total_price(&self) -> &str {
        &self.total_price
    }

    /// Total discount text
    pub fn total_discount(&self) -> &str {
        &self.total_discount
    }

    /// Item rows, in order
    pub fn items(&self) -> &[ItemRow] {
        &self.items
    }

    /// Number of item rows
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Always false; a form keeps at least one row.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Replace the total price text
    pub fn set_total_price(&mut self, text: impl Into<String>) {
        self.total_price = text.into();
    }

    /// Replace the total discount text
    pub fn set_total_discount(&mut self, text: impl Into<String>) {
        self.total_discount = text.into();
    }

    /// Append a blank item row and return its index.
    pub fn add_item(&mut self) -> usize {
        self.items.push(ItemRow::default());
        self.items.len() - 1
    }

    /// Remove the item row at `index`, keeping the order of the others.
    ///
    /// # Errors
    ///
    /// - [`FormError::NoSuchItem`]: `index` is out of range.
    /// - [`FormError::LastItem`]: the row is the only one left.
    pub fn remove_item(&mut self, index: usize) -> Result<ItemRow, FormError> {
        if index >= self.items.len() {
            return Err(FormError::NoSuchItem(index));
        }

        if self.items.len() == 1 {
            return Err(FormError::LastItem);
        }

        Ok(self.items.remove(index))
    }

    /// Replace the price text of the item row at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::NoSuchItem`] if `index` is out of range.
    pub fn set_item_price(
        &mut self,
        index: usize,
        text: impl Into<String>,
    ) -> Result<(), FormError> {
        self.row_mut(index)?.price = text.into();

        Ok(())
    }

    /// Replace the quantity text of the item row at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::NoSuchItem`] if `index` is out of range.
    pub fn set_item_quantity(
        &mut self,
        index: usize,
        text: impl Into<String>,
    ) -> Result<(), FormError> {
        self.row_mut(index)?.quantity = text.into();

        Ok(())
    }

    /// Parse the form into typed totals and line items.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::InvalidInput`] naming the first field that does
    /// not hold a valid number.
    pub fn parse(&self) -> Result<(Totals, Vec<LineItem>), FormError> {
        let total_price = parse_amount(&self.total_price, Field::TotalPrice)?;
        let total_discount = parse_amount(&self.total_discount, Field::TotalDiscount)?;

        let items = self
            .items
            .iter()
            .enumerate()
            .map(|(idx, row)| {
                let price = parse_price(&row.price, Field::ItemPrice(idx))?;
                let quantity = parse_quantity(&row.quantity, Field::ItemQuantity(idx))?;

                Ok(LineItem::new(price, quantity))
            })
            .collect::<Result<Vec<_>, FormError>>()?;

        Ok((Totals::new(total_price, total_discount), items))
    }

    /// Parse the form and allocate the discount across its items.
    ///
    /// Amounts are `Decimal`, so finite numbers outside its range (`1e29`, or a
    /// discount so large that a share overflows) fail here and render as
    /// `Invalid input` like any other unusable field.
    ///
    /// # Errors
    ///
    /// Returns an error if any field is invalid or the allocation fails.
    #[tracing::instrument(
        name = "form.calculate",
        skip(self),
        fields(rows = self.items.len()),
        err
    )]
    pub fn calculate(&self) -> Result<Allocation, FormError> {
        let (totals, items) = self.parse()?;

        debug!(?totals, "parsed form");

        Ok(allocate(&totals, &items)?)
    }

    fn row_mut(&mut self, index: usize) -> Result<&mut ItemRow, FormError> {
        self.items
            .get_mut(index)
            .ok_or(FormError::NoSuchItem(index))
    }
}

/// Parse a finite decimal amount, accepting plain or scientific notation.
/// Digit separators (`1_000`) are not numbers here.
fn parse_amount(text: &str, field: Field) -> Result<Decimal, FormError> {
    let trimmed = text.trim();

    if trimmed.contains('_') {
        return Err(invalid(field, text));
    }

    Decimal::from_str(trimmed)
        .or_else(|_err| Decimal::from_scientific(trimmed))
        .map_err(|_err| invalid(field, text))
}

/// Parse a non-negative unit price.
fn parse_price(text: &str, field: Field) -> Result<Decimal, FormError> {
    let price = parse_amount(text, field)?;

    if price.is_sign_negative() && !price.is_zero() {
        return Err(invalid(field, text));
    }

    Ok(price)
}

/// Parse a non-negative whole quantity. Integer-valued text such as `3.0` or
/// `2e0` is accepted.
fn parse_quantity(text: &str, field: Field) -> Result<u32, FormError> {
    let quantity = parse_amount(text, field)?;

    if !quantity.fract().is_zero() {
        return Err(invalid(field, text));
    }

    quantity.to_u32().ok_or_else(|| invalid(field, text))
}

fn invalid(field: Field, text: &str) -> FormError {
    FormError::InvalidInput {
        field,
        text: text.to_string(),
    }
}
