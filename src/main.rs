//! Dayone pricing calculator
//!
//! Reads totals and line items from flags or a YAML quote file, allocates the
//! discount, and prints the result.

use std::io;

use anyhow::Result;
use tracing::info;

use dayone::{
    config::{Config, OutputFormat},
    logging,
    receipt::Receipt,
};

/// Dayone pricing calculator entry point
pub fn main() -> Result<()> {
    let config = Config::load().unwrap_or_else(|err| err.exit());

    logging::init(&config)?;

    let (form, format) = config.form()?;

    info!(rows = form.len(), "calculating");

    let receipt = Receipt::from_result(form.calculate());

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match config.output {
        OutputFormat::Lines => receipt.write_lines(&mut handle, format)?,
        OutputFormat::Table => receipt.write_table(&mut handle, format)?,
    }

    Ok(())
}
