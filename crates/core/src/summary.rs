//! Order Summary
//!
//! Plain-text rendering of priced line items and totals, for terminals and logs.

use std::io;

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use smallvec::{SmallVec, smallvec};
use tabled::{
    builder::Builder,
    settings::{Alignment, Style, object::Columns},
};
use thiserror::Error;

use crate::{items::LineItem, pricing::Totals, promotions::Promotion};

/// Errors that can occur while writing a summary.
#[derive(Debug, Error)]
pub enum SummaryError {
    /// Writing to the output failed.
    #[error("failed to write order summary")]
    Io(#[from] io::Error),
}

/// Priced items plus their totals, ready to print.
#[derive(Debug, Clone, Copy)]
pub struct OrderSummary<'a> {
    items: &'a [LineItem],
    totals: Totals,
    promotion: Option<&'a Promotion>,
}

impl<'a> OrderSummary<'a> {
    /// Summarise `items` priced as `totals`.
    pub fn new(items: &'a [LineItem], totals: Totals, promotion: Option<&'a Promotion>) -> Self {
        Self {
            items,
            totals,
            promotion,
        }
    }

    /// Write the line table followed by the totals block.
    ///
    /// # Errors
    ///
    /// Returns [`SummaryError::Io`] if the output cannot be written.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), SummaryError> {
        let currency = self.totals.currency();
        let mut builder = Builder::default();

        builder.push_record(["Item", "Options", "Unit Price", "Qty", "Line Total"]);

        for item in self.items {
            builder.push_record([
                item.variant.name.clone(),
                item.variant.attributes().unwrap_or_default(),
                minor_money(item.variant.unit_price, currency).to_string(),
                item.quantity.to_string(),
                minor_money(item.line_total(), currency).to_string(),
            ]);
        }

        let mut table = builder.build();

        table.with(Style::modern_rounded());
        table.modify(Columns::new(2..5), Alignment::right());

        writeln!(out, "{table}")?;

        self.write_totals(&mut out)
    }

    fn write_totals(&self, out: &mut impl io::Write) -> Result<(), SummaryError> {
        let discount_label = match self.promotion {
            Some(promotion) => format!("Discount ({}):", promotion.code),
            None => "Discount:".to_string(),
        };

        let rows: SmallVec<[(String, String); 4]> = smallvec![
            ("Subtotal:".to_string(), self.totals.subtotal().to_string()),
            (
                discount_label,
                format!(
                    "({:.2}%) -{}",
                    percent_points(self.totals.savings_percent()),
                    self.totals.discount()
                ),
            ),
            ("Shipping:".to_string(), self.totals.shipping().to_string()),
            ("Total:".to_string(), self.totals.total().to_string()),
        ];

        let label_width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
        let value_width = rows.iter().map(|(_, value)| value.len()).max().unwrap_or(0);

        for (label, value) in &rows {
            writeln!(out, " {label:>label_width$}  {value:>value_width$}")?;
        }

        Ok(())
    }
}

fn minor_money(minor: u64, currency: &'static Currency) -> Money<'static, Currency> {
    Money::from_minor(i64::try_from(minor).unwrap_or(i64::MAX), currency)
}

fn percent_points(percentage: Percentage) -> Decimal {
    // `Percentage` is a fraction (e.g. 0.25), so multiply by 100 to print percent points.
    ((percentage * Decimal::ONE) * Decimal::ONE_HUNDRED).round_dp(2)
}
