//! End-to-end tests: text in, receipt out.

use std::{fs, io::Write as _};

use clap::Parser;
use rust_decimal::Decimal;
use testresult::TestResult;

use dayone::{
    allocation::ItemAllocation,
    config::Config,
    form::{ItemRow, PricingForm},
    receipt::{AmountFormat, INVALID_INPUT, Receipt},
};

fn calculate(form: &PricingForm) -> Receipt {
    Receipt::from_result(form.calculate())
}

#[test]
fn edited_form_reconciles() -> TestResult {
    let mut form = PricingForm::new();

    form.set_total_price("129.99");
    form.set_total_discount("17.50");
    form.set_item_price(0, "19.99")?;
    form.set_item_quantity(0, "3")?;

    let idx = form.add_item();
    form.set_item_price(idx, "4.49")?;
    form.set_item_quantity(idx, "7")?;

    let receipt = calculate(&form);

    let Some(allocation) = receipt.allocation() else {
        panic!("expected an allocation, got {receipt:?}");
    };

    let items_total: Decimal = allocation
        .items()
        .iter()
        .map(ItemAllocation::total_discounted_price)
        .sum();

    assert_eq!(
        allocation.final_price(),
        Decimal::new(12999, 2) - Decimal::new(1750, 2) + items_total
    );

    Ok(())
}

#[test]
fn removing_a_row_changes_the_allocation() -> TestResult {
    let mut form = PricingForm::with_items(
        "50",
        "5",
        [
            ItemRow::new("20", "1"),
            ItemRow::new("oops", "1"),
            ItemRow::new("30", "1"),
        ],
    );

    assert_eq!(calculate(&form), Receipt::InvalidInput);

    form.remove_item(1)?;

    assert_eq!(calculate(&form).final_price(AmountFormat::Plain), "92.40");

    Ok(())
}

#[test]
fn empty_total_price_shows_invalid_input() -> TestResult {
    let form = PricingForm::with_items("", "5", [ItemRow::new("20", "1")]);

    let receipt = calculate(&form);

    assert_eq!(receipt.final_price(AmountFormat::Plain), INVALID_INPUT);
    assert!(receipt.item_lines(AmountFormat::Plain).is_empty());

    let mut out = Vec::new();
    receipt.write_lines(&mut out, AmountFormat::Plain)?;

    assert_eq!(String::from_utf8(out)?, "Invalid input\n");

    Ok(())
}

#[test]
fn zero_total_price_shows_invalid_input() {
    let form = PricingForm::with_items("0", "5", [ItemRow::new("20", "1")]);

    assert_eq!(calculate(&form), Receipt::InvalidInput);
}

#[test]
fn repeated_calculation_is_identical() {
    let form = PricingForm::with_items(
        "75",
        "9",
        [ItemRow::new("15", "2"), ItemRow::new("9", "5")],
    );

    assert_eq!(calculate(&form), calculate(&form));
}

#[test]
fn quote_file_and_flags_combine() -> TestResult {
    let mut file = tempfile::NamedTempFile::new()?;

    writeln!(
        file,
        "currency: USD\ntotal_price: 10\ntotal_discount: 1\nitems:\n  - price: 20\n    quantity: 1\n"
    )?;

    let path = file.path().to_string_lossy().to_string();

    let config = Config::try_parse_from([
        "dayone", "--file", path.as_str(), "--total-price", "50", "--total-discount", "5", "--item",
        "30:1",
    ])?;

    let (form, format) = config.form()?;

    assert_eq!(
        form.items(),
        &[ItemRow::new("20", "1"), ItemRow::new("30", "1")]
    );

    let receipt = calculate(&form);

    assert_eq!(receipt.final_price(format), "$92.40");

    Ok(())
}

#[test]
fn table_output_lists_every_item() -> TestResult {
    let dir = tempfile::tempdir()?;
    let quotes = dir.path().join("quotes");
    fs::create_dir_all(&quotes)?;
    fs::write(
        quotes.join("three.yml"),
        "total_price: 60\ntotal_discount: 6\nitems:\n  - price: 10\n    quantity: 1\n  - price: 20\n    quantity: 1\n  - price: 30\n    quantity: 1\n",
    )?;

    let fixture = dayone::fixtures::Fixture::load(dir.path(), "three")?;
    let receipt = calculate(fixture.form());

    let mut out = Vec::new();
    receipt.write_table(&mut out, fixture.format())?;

    let output = String::from_utf8(out)?;

    assert!(output.contains("#1"));
    assert!(output.contains("#2"));
    assert!(output.contains("#3"));
    assert!(output.contains("Final price:"));

    Ok(())
}
