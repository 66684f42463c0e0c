//! Allocation
//!
//! Spreads an overall discount across line items in proportion to each item's
//! share of the combined item value, then reconciles the result against the
//! overall totals.

use rust_decimal::Decimal;
use smallvec::SmallVec;
use thiserror::Error;
use tracing::debug;

use crate::{
    items::LineItem,
    pricing::{PricingError, Totals, total_item_value},
};

/// Errors specific to discount allocation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AllocationError {
    /// Per-item arithmetic overflowed (index of the item being allocated).
    #[error("arithmetic overflow while allocating item {0}")]
    Overflow(usize),

    /// Errors bubbled up from the totals calculation.
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

/// The discount allocated to a single line item.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ItemAllocation {
    item: LineItem,

    /// Percentage points of the overall discount rate carried by this item.
    discount_share: Decimal,

    discounted_price: Decimal,
    total_discounted_price: Decimal,
    item_discount: Decimal,
    total_item_discount: Decimal,
}

impl ItemAllocation {
    /// Original unit price
    pub fn price(&self) -> Decimal {
        self.item.price()
    }

    /// Number of units
    pub fn quantity(&self) -> u32 {
        self.item.quantity()
    }

    /// Percentage points of discount applied to this item's unit price
    pub fn discount_share(&self) -> Decimal {
        self.discount_share
    }

    /// Unit price after the discount share is applied
    pub fn discounted_price(&self) -> Decimal {
        self.discounted_price
    }

    /// `discounted_price * quantity`
    pub fn total_discounted_price(&self) -> Decimal {
        self.total_discounted_price
    }

    /// Discount per unit (`price - discounted_price`)
    pub fn item_discount(&self) -> Decimal {
        self.item_discount
    }

    /// `item_discount * quantity`
    pub fn total_item_discount(&self) -> Decimal {
        self.total_item_discount
    }
}

/// The outcome of allocating a discount across a set of line items.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Allocation {
    totals: Totals,
    items: SmallVec<[ItemAllocation; 8]>,
    total_item_value: Decimal,
    discount_percentage: Decimal,
    final_items_price: Decimal,
    final_price: Decimal,
}

impl Allocation {
    /// Totals the allocation was computed against
    pub fn totals(&self) -> &Totals {
        &self.totals
    }

    /// Per-item allocations, in input order
    pub fn items(&self) -> &[ItemAllocation] {
        &self.items
    }

    /// Sum of `price * quantity` over all items
    pub fn total_item_value(&self) -> Decimal {
        self.total_item_value
    }

    /// The overall discount expressed in percentage points of the total price
    pub fn discount_percentage(&self) -> Decimal {
        self.discount_percentage
    }

    /// Sum of every item's `total_discounted_price`
    pub fn final_items_price(&self) -> Decimal {
        self.final_items_price
    }

    /// `total_price - total_discount + final_items_price`
    pub fn final_price(&self) -> Decimal {
        self.final_price
    }

    /// Sum of every item's `total_item_discount`.
    ///
    /// # Errors
    ///
    /// Returns [`AllocationError::Overflow`] if the sum overflows.
    pub fn allocated_discount(&self) -> Result<Decimal, AllocationError> {
        self.items
            .iter()
            .enumerate()
            .try_fold(Decimal::ZERO, |acc, (idx, item)| {
                acc.checked_add(item.total_item_discount)
                    .ok_or(AllocationError::Overflow(idx))
            })
    }
}

/// Allocates the overall discount in `totals` across `items`.
///
/// Each item's share of the discount percentage is weighted by its contribution
/// to the combined item value. When the items carry no value at all every
/// share is zero and each item keeps its price.
///
/// # Errors
///
/// Returns an error if:
/// - the total price is zero, so the discount percentage is undefined
///   ([`PricingError::ZeroTotalPrice`]).
/// - any intermediate value overflows ([`PricingError::Overflow`] for totals,
///   [`AllocationError::Overflow`] for a specific item).
#[tracing::instrument(
    name = "allocation.allocate",
    skip(items),
    fields(item_count = items.len()),
    err
)]
pub fn allocate(totals: &Totals, items: &[LineItem]) -> Result<Allocation, AllocationError> {
    let total_item_value = total_item_value(items)?;
    let discount_percentage = discount_percentage(totals)?;

    if total_item_value.is_zero() {
        debug!("items carry no value; allocating zero discount to every item");
    }

    let items = items
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            allocate_item(item, total_item_value, discount_percentage)
                .ok_or(AllocationError::Overflow(idx))
        })
        .collect::<Result<SmallVec<[ItemAllocation; 8]>, _>>()?;

    let final_items_price = items
        .iter()
        .enumerate()
        .try_fold(Decimal::ZERO, |acc, (idx, item)| {
            acc.checked_add(item.total_discounted_price)
                .ok_or(AllocationError::Overflow(idx))
        })?;

    let final_price = totals
        .net_price()?
        .checked_add(final_items_price)
        .ok_or(PricingError::Overflow)?;

    debug!(
        %total_item_value,
        %discount_percentage,
        %final_items_price,
        %final_price,
        "allocated discount"
    );

    Ok(Allocation {
        totals: *totals,
        items,
        total_item_value,
        discount_percentage,
        final_items_price,
        final_price,
    })
}

/// The discount rate of `totals` in percentage points.
fn discount_percentage(totals: &Totals) -> Result<Decimal, PricingError> {
    let rate = totals.discount_rate()? * Decimal::ONE;

    rate.checked_mul(Decimal::ONE_HUNDRED)
        .ok_or(PricingError::Overflow)
}

/// Allocate the discount to one item, returning `None` on overflow.
fn allocate_item(
    item: &LineItem,
    total_item_value: Decimal,
    discount_percentage: Decimal,
) -> Option<ItemAllocation> {
    let price = item.price();
    let quantity = Decimal::from(item.quantity());

    let discount_share = if total_item_value.is_zero() {
        Decimal::ZERO
    } else {
        item.value()?
            .checked_div(total_item_value)?
            .checked_mul(discount_percentage)?
    };

    let remaining = Decimal::ONE.checked_sub(discount_share.checked_div(Decimal::ONE_HUNDRED)?)?;
    let discounted_price = price.checked_mul(remaining)?;
    let item_discount = price.checked_sub(discounted_price)?;

    Some(ItemAllocation {
        item: *item,
        discount_share,
        discounted_price,
        total_discounted_price: discounted_price.checked_mul(quantity)?,
        item_discount,
        total_item_discount: item_discount.checked_mul(quantity)?,
    })
}
