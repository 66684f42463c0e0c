//! Command line configuration

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::{
    fixtures::{Fixture, FixtureError, parse_currency},
    form::{ItemRow, PricingForm},
    receipt::AmountFormat,
};

/// How the result is printed.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One line per item, then the final price
    Lines,

    /// A table with a summary underneath
    #[default]
    Table,
}

/// Log output layer.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human readable, single line per event
    #[default]
    Compact,

    /// One JSON object per event
    Json,
}

/// Dayone pricing calculator configuration
#[derive(Debug, Parser)]
#[command(
    name = "dayone",
    about = "Allocate an overall discount across line items",
    long_about = None
)]
pub struct Config {
    /// Overall price
    #[arg(short = 'p', long, env = "DAYONE_TOTAL_PRICE", allow_hyphen_values = true)]
    pub total_price: Option<String>,

    /// Overall discount
    #[arg(short = 'd', long, env = "DAYONE_TOTAL_DISCOUNT", allow_hyphen_values = true)]
    pub total_discount: Option<String>,

    /// Line item as `PRICE:QUANTITY` (or just `PRICE` for a single unit); repeatable
    #[arg(short, long = "item", value_name = "PRICE:QUANTITY", allow_hyphen_values = true)]
    pub items: Vec<String>,

    /// Read the form from a YAML quote file; flags override its totals and add items
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Print amounts as money in this currency (GBP, USD or EUR)
    #[arg(short, long, env = "DAYONE_CURRENCY")]
    pub currency: Option<String>,

    /// Output layout
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "warn")]
    pub log_level: String,

    /// Log format
    #[arg(long, value_enum, env = "DAYONE_LOG_FORMAT", default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

impl Config {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        Self::try_parse()
    }

    /// Build the form described by the quote file (if any) and the flags.
    ///
    /// Flag totals replace the file's totals; flag items are appended after the
    /// file's items.
    ///
    /// # Errors
    ///
    /// Returns an error if the quote file cannot be loaded.
    pub fn form(&self) -> Result<(PricingForm, AmountFormat), FixtureError> {
        let (mut total_price, mut total_discount, mut rows, mut format) = match &self.file {
            Some(path) => {
                let fixture = Fixture::from_path(path)?;
                let format = fixture.format();
                let form = fixture.into_form();

                (
                    form.total_price().to_string(),
                    form.total_discount().to_string(),
                    form.items().to_vec(),
                    format,
                )
            }
            None => (String::new(), String::new(), Vec::new(), AmountFormat::Plain),
        };

        if let Some(text) = &self.total_price {
            total_price.clone_from(text);
        }

        if let Some(text) = &self.total_discount {
            total_discount.clone_from(text);
        }

        if !self.items.is_empty() {
            rows.retain(|row| *row != ItemRow::default());
            rows.extend(self.items.iter().map(String::as_str).map(parse_item_arg));
        }

        if let Some(code) = &self.currency {
            format = AmountFormat::Money(parse_currency(code)?);
        }

        Ok((PricingForm::with_items(total_price, total_discount, rows), format))
    }
}

/// Split a `PRICE:QUANTITY` argument into an item row. A bare price means one unit.
fn parse_item_arg(arg: &str) -> ItemRow {
    match arg.split_once(':') {
        Some((price, quantity)) => ItemRow::new(price, quantity),
        None => ItemRow::new(arg, "1"),
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn parses_totals_and_items() -> TestResult {
        let config = Config::try_parse_from([
            "dayone", "-p", "50", "-d", "5", "-i", "20:1", "-i", "30",
        ])?;

        let (form, format) = config.form()?;

        assert_eq!(form.total_price(), "50");
        assert_eq!(form.total_discount(), "5");
        assert_eq!(
            form.items(),
            &[ItemRow::new("20", "1"), ItemRow::new("30", "1")]
        );
        assert_eq!(format, AmountFormat::Plain);

        Ok(())
    }

    #[test]
    fn no_items_leaves_one_blank_row() -> TestResult {
        let config = Config::try_parse_from(["dayone", "-p", "50", "-d", "5"])?;

        let (form, _) = config.form()?;

        assert_eq!(form.items(), &[ItemRow::default()]);

        Ok(())
    }

    #[test]
    fn currency_flag_selects_money_format() -> TestResult {
        let config = Config::try_parse_from(["dayone", "--currency", "gbp"])?;

        let (_, format) = config.form()?;

        assert_eq!(format, AmountFormat::Money(rusty_money::iso::GBP));

        Ok(())
    }

    #[test]
    fn unknown_currency_is_an_error() -> TestResult {
        let config = Config::try_parse_from(["dayone", "--currency", "XYZ"])?;

        assert!(matches!(
            config.form(),
            Err(FixtureError::UnknownCurrency(code)) if code == "XYZ"
        ));

        Ok(())
    }

    #[test]
    fn output_and_log_format_defaults() -> TestResult {
        let config = Config::try_parse_from(["dayone"])?;

        assert_eq!(config.output, OutputFormat::Table);
        assert_eq!(config.log_format, LogFormat::Compact);

        Ok(())
    }

    #[test]
    fn negative_item_flag_reaches_the_form() -> TestResult {
        let config = Config::try_parse_from([
            "dayone", "-p", "50", "-d", "5", "-i", "-5:1", "--item", "-3",
        ])?;

        let (form, _) = config.form()?;

        assert_eq!(
            form.items(),
            &[ItemRow::new("-5", "1"), ItemRow::new("-3", "1")]
        );
        assert!(form.calculate().is_err());

        Ok(())
    }

    #[test]
    fn parse_item_arg_splits_on_colon() {
        assert_eq!(parse_item_arg("12.5:3"), ItemRow::new("12.5", "3"));
        assert_eq!(parse_item_arg("7"), ItemRow::new("7", "1"));
    }
}
