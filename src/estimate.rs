//! The `estimate` command: resolve, fetch, aggregate, and display.

use anyhow::Result;
use comfy_table::Cell;
use futures::future::join_all;

use crate::config::FundEntry;
use crate::error::ResolutionError;
use crate::ui;
use crate::valuation::{Estimator, FundSnapshot};

pub async fn run(estimator: &Estimator, funds: &[FundEntry]) -> Result<()> {
    if funds.is_empty() {
        println!("No funds configured. Add funds to the config or pass fund codes as arguments.");
        return Ok(());
    }

    let pb = ui::new_progress_bar(funds.len() as u64, true);
    pb.set_message("Estimating funds...");

    let snapshot_futures = funds.iter().map(|fund| {
        let pb_clone = pb.clone();
        async move {
            let result = estimator.snapshot(&fund.code).await;
            pb_clone.inc(1);
            (fund, result)
        }
    });
    let results: Vec<(&FundEntry, Result<FundSnapshot, ResolutionError>)> =
        join_all(snapshot_futures).await;
    pb.finish_and_clear();

    let num_funds = results.len();
    for (i, (fund, result)) in results.into_iter().enumerate() {
        let title = match &fund.name {
            Some(name) => format!("{} ({})", name, fund.code),
            None => fund.code.clone(),
        };
        println!("\nFund: {}", ui::style_text(&title, ui::StyleType::Title));

        match result {
            Ok(snapshot) => display_snapshot(&snapshot),
            Err(e) => println!(
                "{}",
                ui::style_text(&format!("Could not resolve holdings: {e}"), ui::StyleType::Error)
            ),
        }

        if i < num_funds - 1 {
            ui::print_separator();
        }
    }

    Ok(())
}

fn display_snapshot(snapshot: &FundSnapshot) {
    if snapshot.holdings.is_empty() {
        println!(
            "{}",
            ui::style_text(
                "No stock holdings published for this fund.",
                ui::StyleType::Subtle
            )
        );
        return;
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Stock"),
        ui::header_cell("Name"),
        ui::header_cell("Weight (%)"),
        ui::header_cell("Market Value"),
        ui::header_cell("Change"),
    ]);

    for holding in &snapshot.holdings {
        let weight = ui::format_optional_cell(holding.weight_pct, |w| format!("{w:.2}"));
        let market_value = ui::format_optional_cell(holding.market_value, |v| format!("{v:.2}"));
        let change = snapshot
            .quotes
            .get(&holding.identifier)
            .map_or_else(ui::na_cell, |q| ui::change_cell(q.change_pct));

        table.add_row(vec![
            Cell::new(holding.identifier.to_string()),
            Cell::new(&holding.name),
            weight,
            market_value,
            change,
        ]);
    }

    println!("{table}");

    let estimate = &snapshot.estimate;
    let pct_style = if estimate.change_pct >= 0.0 {
        ui::StyleType::Gain
    } else {
        ui::StyleType::Loss
    };
    println!(
        "\nEstimated change: {}   (value {:+.2} on {:.2})",
        ui::style_text(&format!("{:+.2}%", estimate.change_pct), pct_style),
        estimate.change_value,
        estimate.total_market_value,
    );

    if estimate.total_market_value == 0.0 {
        println!(
            "{}",
            ui::style_text(
                "No quote coverage for any holding; estimate is low-confidence.",
                ui::StyleType::Subtle
            )
        );
    }
}
