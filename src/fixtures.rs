//! Fixtures
//!
//! Quote files: YAML documents describing a filled-in form.
//!
//! ```yaml
//! currency: GBP
//! total_price: 50
//! total_discount: 5
//! items:
//!   - price: 20
//!     quantity: 1
//!   - price: "30.00"
//!     quantity: 1
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
};

use rusty_money::iso::{Currency, EUR, GBP, USD};
use serde::Deserialize;
use thiserror::Error;

use crate::{
    form::{ItemRow, PricingForm},
    receipt::AmountFormat,
};

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),
}

/// A field value as written in YAML. Numbers are kept as text so the form
/// validates them the same way as typed input.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FieldText {
    Text(String),
    Integer(i64),
    Float(f64),
}

impl From<FieldText> for String {
    fn from(value: FieldText) -> Self {
        match value {
            FieldText::Text(text) => text,
            FieldText::Integer(value) => value.to_string(),
            FieldText::Float(value) => value.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ItemFixture {
    price: FieldText,
    quantity: FieldText,
}

#[derive(Debug, Deserialize)]
struct QuoteFixture {
    #[serde(default)]
    currency: Option<String>,
    total_price: FieldText,
    total_discount: FieldText,
    #[serde(default)]
    items: Vec<ItemFixture>,
}

/// A loaded quote: the form it describes and how its amounts should be shown.
///
/// Loading never validates the numbers. A quote whose amounts do not fit a
/// `Decimal` (e.g. `total_price: 1e29`) loads fine and calculates to
/// `Invalid input`.
#[derive(Debug)]
pub struct Fixture {
    form: PricingForm,
    format: AmountFormat,
}

impl Fixture {
    /// Parse a quote from YAML text
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed or names an unsupported currency.
    pub fn from_yaml(contents: &str) -> Result<Self, FixtureError> {
        let fixture: QuoteFixture = serde_norway::from_str(contents)?;

        let format = fixture
            .currency
            .as_deref()
            .map(parse_currency)
            .transpose()?
            .map_or(AmountFormat::Plain, AmountFormat::Money);

        let items: Vec<ItemRow> = fixture
            .items
            .into_iter()
            .map(|item| ItemRow::new(item.price, item.quantity))
            .collect();

        Ok(Self {
            form: PricingForm::with_items(fixture.total_price, fixture.total_discount, items),
            format,
        })
    }

    /// Load a quote from a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, FixtureError> {
        let contents = fs::read_to_string(path)?;

        Self::from_yaml(&contents)
    }

    /// Load the named quote from `<base_path>/quotes/<name>.yml`
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(base_path: impl Into<PathBuf>, name: &str) -> Result<Self, FixtureError> {
        let file_path = base_path.into().join("quotes").join(format!("{name}.yml"));

        Self::from_path(file_path)
    }

    /// Load the named quote from the default `./fixtures` directory
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        Self::load("./fixtures", name)
    }

    /// The form described by the quote
    pub fn form(&self) -> &PricingForm {
        &self.form
    }

    /// Take ownership of the form
    pub fn into_form(self) -> PricingForm {
        self.form
    }

    /// How amounts in this quote should be printed
    pub fn format(&self) -> AmountFormat {
        self.format
    }
}

/// Look up a supported currency by ISO code (case-insensitive).
///
/// # Errors
///
/// Returns [`FixtureError::UnknownCurrency`] for anything other than GBP, USD or EUR.
pub fn parse_currency(code: &str) -> Result<&'static Currency, FixtureError> {
    match code.trim().to_ascii_uppercase().as_str() {
        "GBP" => Ok(GBP),
        "USD" => Ok(USD),
        "EUR" => Ok(EUR),
        _ => Err(FixtureError::UnknownCurrency(code.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn from_yaml_accepts_numbers_and_text() -> TestResult {
        let fixture = Fixture::from_yaml(
            "total_price: 50\ntotal_discount: \"5\"\nitems:\n  - price: 19.5\n    quantity: 2\n",
        )?;

        assert_eq!(fixture.form().total_price(), "50");
        assert_eq!(fixture.form().total_discount(), "5");
        assert_eq!(fixture.form().items(), &[ItemRow::new("19.5", "2")]);
        assert_eq!(fixture.format(), AmountFormat::Plain);

        Ok(())
    }

    #[test]
    fn from_yaml_without_items_gets_blank_row() -> TestResult {
        let fixture = Fixture::from_yaml("total_price: 10\ntotal_discount: 1\n")?;

        assert_eq!(fixture.form().items(), &[ItemRow::default()]);

        Ok(())
    }

    #[test]
    fn from_yaml_reads_currency() -> TestResult {
        let fixture = Fixture::from_yaml(
            "currency: usd\ntotal_price: 10\ntotal_discount: 1\nitems: []\n",
        )?;

        assert_eq!(fixture.format(), AmountFormat::Money(USD));

        Ok(())
    }

    #[test]
    fn from_yaml_rejects_unknown_currency() {
        let result = Fixture::from_yaml("currency: ABC\ntotal_price: 10\ntotal_discount: 1\n");

        assert!(matches!(result, Err(FixtureError::UnknownCurrency(code)) if code == "ABC"));
    }

    #[test]
    fn from_yaml_rejects_missing_totals() {
        let result = Fixture::from_yaml("items: []\n");

        assert!(matches!(result, Err(FixtureError::Yaml(_))));
    }

    #[test]
    fn loaded_form_calculates() -> TestResult {
        let fixture = Fixture::from_yaml(
            "total_price: 100\ntotal_discount: 10\nitems:\n  - price: 50\n    quantity: 2\n",
        )?;

        let allocation = fixture.form().calculate()?;

        assert_eq!(allocation.final_price(), Decimal::from(180));

        Ok(())
    }

    #[test]
    fn parse_currency_accepts_supported_codes() -> TestResult {
        assert_eq!(parse_currency("GBP")?, GBP);
        assert_eq!(parse_currency(" eur ")?, EUR);

        Ok(())
    }
}
