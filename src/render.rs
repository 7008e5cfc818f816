use std::fmt::Write as _;

use crate::config::DisplayConfig;
use crate::ledger::{Amount, ExpenseRecord, ExpenseSummary};

/// Each bar glyph stands for this many percent
const PERCENT_PER_GLYPH: u32 = 5;

/// Shown instead of a summary when no record matches
pub const NO_EXPENSES: &str = "No expenses to show.";

/// Formats an amount with the currency symbol, thousands separators and two decimals
#[must_use]
pub fn format_money(symbol: &str, amount: Amount) -> String {
    let fixed = format!("{:.2}", amount.abs().round_dp(2));
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount.is_sign_negative() && !amount.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}{symbol}{grouped}.{fraction}")
}

/// One glyph per full 5 percent
#[must_use]
pub fn percent_bar(percent: u32, glyph: &str) -> String {
    glyph.repeat((percent / PERCENT_PER_GLYPH) as usize)
}

/// Total plus per-category breakdown, or the empty-state message
#[must_use]
pub fn render_summary(summary: &ExpenseSummary, display: &DisplayConfig) -> String {
    if summary.is_empty() {
        return NO_EXPENSES.to_owned();
    }

    let symbol = display.currency_symbol.as_str();
    let mut out = format!("Total Spent: {}\n", format_money(symbol, summary.total()));
    out.push_str("Expense Breakdown\n");
    for entry in summary.categories() {
        let _ = writeln!(
            out,
            "{}: {} ({}%)  {}",
            entry.category,
            format_money(symbol, entry.total),
            entry.percent,
            percent_bar(entry.percent, &display.bar_glyph)
        );
    }
    out
}

/// Numbered listing `n. amount | category | description`, starting at 1
#[must_use]
pub fn render_details<'a, I>(records: I, display: &DisplayConfig) -> String
where
    I: IntoIterator<Item = &'a ExpenseRecord>,
{
    let mut out = String::new();
    for (i, record) in records.into_iter().enumerate() {
        let _ = writeln!(out, "{}. {}", i + 1, render_record(record, display));
    }
    if out.is_empty() {
        out.push_str(NO_EXPENSES);
    }
    out
}

/// Single record as `amount | category | description`
#[must_use]
pub fn render_record(record: &ExpenseRecord, display: &DisplayConfig) -> String {
    format!(
        "{} | {} | {}",
        format_money(&display.currency_symbol, record.amount()),
        record.category(),
        record.description()
    )
}
