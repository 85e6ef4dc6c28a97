use super::ui;
use crate::core::rates::{RateSource, RateTable};
use anyhow::Result;

/// Renders the currencies available for conversion with their rates.
pub fn display_rates(table: &RateTable) -> String {
    if table.is_empty() {
        return ui::style_text("Rates unavailable", ui::StyleType::Error);
    }

    let base = table.base();
    let mut rates_table = ui::new_styled_table();
    rates_table.set_header(vec![
        ui::header_cell("Currency"),
        ui::header_cell(&format!("Rate (per 1 {base})")),
    ]);

    for code in table.codes() {
        let rate = if code == base {
            1.0
        } else {
            table.get(&code).unwrap_or(1.0)
        };
        rates_table.add_row(vec![
            comfy_table::Cell::new(&code),
            ui::number_cell(format!("{rate:.4}")),
        ]);
    }

    let as_of = table
        .date()
        .map_or("latest".to_string(), |d| d.format("%Y-%m-%d").to_string());

    format!(
        "{}\n\n{}\n\n{}",
        ui::style_text(&format!("Exchange rates ({as_of})"), ui::StyleType::Title),
        rates_table,
        ui::style_text(
            &format!("{} currencies", table.codes().len()),
            ui::StyleType::Subtle
        )
    )
}

pub async fn run(source: &dyn RateSource) -> Result<RateTable> {
    let pb = ui::new_spinner("Fetching exchange rates");
    let table = source.fetch().await;
    pb.finish_and_clear();

    println!("{}", display_rates(&table));
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::collections::HashMap;

    #[test]
    fn test_display_rates_lists_all_codes() {
        let table = RateTable::with_details(
            "EUR",
            NaiveDate::from_ymd_opt(2024, 3, 1),
            HashMap::from([("USD".to_string(), 1.1), ("GBP".to_string(), 0.85)]),
        );
        let output = console::strip_ansi_codes(&display_rates(&table)).to_string();

        assert!(output.contains("Exchange rates (2024-03-01)"));
        assert!(output.contains("Rate (per 1 EUR)"));
        assert!(output.contains("EUR"));
        assert!(output.contains("1.0000"));
        assert!(output.contains("USD"));
        assert!(output.contains("1.1000"));
        assert!(output.contains("GBP"));
        assert!(output.contains("0.8500"));
        assert!(output.contains("3 currencies"));
    }

    #[test]
    fn test_display_rates_when_unavailable() {
        let output = console::strip_ansi_codes(&display_rates(&RateTable::empty())).to_string();
        assert_eq!(output, "Rates unavailable");
    }
}
