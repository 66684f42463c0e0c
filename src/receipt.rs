//! Receipt
//!
//! Renders an allocation for people: one text line per item, or a table with a
//! short summary underneath. A failed calculation renders as [`INVALID_INPUT`].

use std::{fmt, io};

use rust_decimal::{Decimal, RoundingStrategy};
use rusty_money::{Money, iso::Currency};
use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;
use tracing::debug;

use crate::allocation::{Allocation, AllocationError, ItemAllocation};

/// Marker shown in place of any result when the input could not be used.
pub const INVALID_INPUT: &str = "Invalid input";

/// Errors that can occur when writing a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// Writing to the output failed.
    #[error("failed to write receipt: {0}")]
    Io(#[from] io::Error),

    /// A summary figure could not be computed.
    #[error(transparent)]
    Allocation(#[from] AllocationError),
}

/// How monetary amounts are printed.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum AmountFormat {
    /// Two decimal places, no currency symbol (e.g. `19.20`).
    #[default]
    Plain,

    /// Formatted as money in the given currency (e.g. `£19.20`).
    Money(&'static Currency),
}

impl AmountFormat {
    /// Round `amount` half away from zero to two places and format it.
    pub fn format(self, amount: Decimal) -> String {
        let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

        match self {
            AmountFormat::Plain => format!("{rounded:.2}"),
            AmountFormat::Money(currency) => Money::from_decimal(rounded, currency).to_string(),
        }
    }
}

/// The presentable outcome of one calculation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Receipt {
    /// The discount was allocated successfully.
    Allocated(Allocation),

    /// Some input could not be used; nothing else is shown.
    InvalidInput,
}

impl Receipt {
    /// Build a receipt from a calculation result. Any error becomes [`Receipt::InvalidInput`].
    pub fn from_result<E: fmt::Display>(result: Result<Allocation, E>) -> Self {
        match result {
            Ok(allocation) => Receipt::Allocated(allocation),
            Err(err) => {
                debug!(%err, "calculation rejected");
                Receipt::InvalidInput
            }
        }
    }

    /// The allocation, if the calculation succeeded
    pub fn allocation(&self) -> Option<&Allocation> {
        match self {
            Receipt::Allocated(allocation) => Some(allocation),
            Receipt::InvalidInput => None,
        }
    }

    /// The final price, or [`INVALID_INPUT`].
    pub fn final_price(&self, format: AmountFormat) -> String {
        match self {
            Receipt::Allocated(allocation) => format.format(allocation.final_price()),
            Receipt::InvalidInput => INVALID_INPUT.to_string(),
        }
    }

    /// One human-readable line per item; empty when the input was invalid.
    pub fn item_lines(&self, format: AmountFormat) -> Vec<String> {
        let Some(allocation) = self.allocation() else {
            return Vec::new();
        };

        allocation
            .items()
            .iter()
            .map(|item| item_line(item, format))
            .collect()
    }

    /// Write the item lines followed by the final price.
    ///
    /// # Errors
    ///
    /// Returns [`ReceiptError::Io`] if writing fails.
    pub fn write_lines(
        &self,
        mut out: impl io::Write,
        format: AmountFormat,
    ) -> Result<(), ReceiptError> {
        if matches!(self, Receipt::InvalidInput) {
            writeln!(out, "{INVALID_INPUT}")?;
            return Ok(());
        }

        for line in self.item_lines(format) {
            writeln!(out, "{line}")?;
        }

        writeln!(out, "Final price: {}", self.final_price(format))?;

        Ok(())
    }

    /// Write the allocation as a table with a summary underneath.
    ///
    /// # Errors
    ///
    /// Returns [`ReceiptError::Io`] if writing fails, or
    /// [`ReceiptError::Allocation`] if the summary overflows.
    pub fn write_table(
        &self,
        mut out: impl io::Write,
        format: AmountFormat,
    ) -> Result<(), ReceiptError> {
        let Receipt::Allocated(allocation) = self else {
            writeln!(out, "{INVALID_INPUT}")?;
            return Ok(());
        };

        let mut builder = Builder::default();

        builder.push_record([
            "",
            "Price",
            "Qty",
            "Share",
            "Discount",
            "Discounted Price",
            "Total Discount",
            "Total",
        ]);

        for (idx, item) in allocation.items().iter().enumerate() {
            builder.push_record([
                format!("#{:<3}", idx + 1),
                format.format(item.price()),
                item.quantity().to_string(),
                percent_points(item.discount_share()),
                format.format(item.item_discount()),
                format.format(item.discounted_price()),
                format.format(item.total_item_discount()),
                format.format(item.total_discounted_price()),
            ]);
        }

        let mut table = builder.build();
        let mut theme = Theme::from(Style::modern_rounded());

        theme.remove_horizontal_lines();
        theme.insert_horizontal_line(
            1,
            HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤')),
        );

        table.with(theme);
        table.modify(Columns::new(1..), Alignment::right());
        table.modify(Rows::first(), Alignment::center());

        writeln!(out, "\n{table}")?;

        write_summary(&mut out, allocation, format)
    }
}

/// Format one item as
/// `Original: P x Q, Discount: D per item, total T, Discounted: DP x Q = TDP`.
fn item_line(item: &ItemAllocation, format: AmountFormat) -> String {
    format!(
        "Original: {} x {}, Discount: {} per item, total {}, Discounted: {} x {} = {}",
        format.format(item.price()),
        item.quantity(),
        format.format(item.item_discount()),
        format.format(item.total_item_discount()),
        format.format(item.discounted_price()),
        item.quantity(),
        format.format(item.total_discounted_price()),
    )
}

/// Percentage points to two places, e.g. `10.00%`.
fn percent_points(points: Decimal) -> String {
    format!("{:.2}%", points.round_dp(2))
}

fn write_summary(
    out: &mut impl io::Write,
    allocation: &Allocation,
    format: AmountFormat,
) -> Result<(), ReceiptError> {
    let totals = allocation.totals();

    let rows = [
        ("Total price:", format.format(totals.total_price())),
        (
            "Discount:",
            format!(
                "({}) {}",
                percent_points(allocation.discount_percentage()),
                format.format(totals.total_discount())
            ),
        ),
        (
            "Item discounts:",
            format.format(allocation.allocated_discount()?),
        ),
        ("Items:", format.format(allocation.final_items_price())),
        ("Final price:", format.format(allocation.final_price())),
    ];

    let label_width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    let value_width = rows
        .iter()
        .map(|(_, value)| value.chars().count())
        .max()
        .unwrap_or(0);

    for (label, value) in &rows {
        writeln!(out, " {label:>label_width$}  {value:>value_width$}")?;
    }

    writeln!(out)?;

    Ok(())
}
