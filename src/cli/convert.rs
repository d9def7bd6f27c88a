use super::ui;
use crate::core::{ConversionOutcome, ConversionState, ConversionViewModel, CurrencyCode};
use anyhow::{Result, anyhow};
use comfy_table::Cell;

impl ConversionState {
    /// One line describing the result area, as a presentation layer would
    /// show it underneath the inputs.
    pub fn result_line(&self) -> String {
        if self.is_loading() {
            "Loading...".to_string()
        } else if let Some(amount) = self.converted_amount {
            format!("{amount:.2} {}", self.target_currency)
        } else if !self.error_message.is_empty() {
            self.error_message.clone()
        } else {
            "Press 'Convert'".to_string()
        }
    }

    pub fn display_as_table(&self) -> String {
        let mut table = ui::new_styled_table();

        table.set_header(vec![
            ui::header_cell("Amount"),
            ui::header_cell("From"),
            ui::header_cell("To"),
            ui::header_cell("Rate"),
            ui::header_cell("Result"),
        ]);

        let target = &self.target_currency;
        table.add_row(vec![
            Cell::new(self.amount_text.trim()),
            Cell::new(self.source_currency.as_str()),
            Cell::new(target.as_str()),
            ui::format_optional_cell(self.rate, |r| format!("{r:.4}")),
            ui::format_optional_cell(self.converted_amount, |v| format!("{v:.2} {target}")),
        ]);

        let mut output = format!(
            "{}\n\n",
            ui::style_text("Currency Exchange", ui::StyleType::Title)
        );
        output.push_str(&table.to_string());

        let result_style = if self.converted_amount.is_some() {
            ui::StyleType::ResultValue
        } else {
            ui::StyleType::Error
        };
        output.push_str(&format!(
            "\n\nResult: {}",
            ui::style_text(&self.result_line(), result_style)
        ));

        if let Some(updated_at) = self.rates_updated_at {
            output.push_str(&format!(
                "\n{}",
                ui::style_text(
                    &format!("Rates updated {}", updated_at.format("%Y-%m-%d %H:%M UTC")),
                    ui::StyleType::Subtle
                )
            ));
        }

        output
    }
}

/// Applies the command-line inputs to the view-model and runs one conversion.
pub async fn run(
    view_model: &ConversionViewModel,
    amount: &str,
    from: Option<CurrencyCode>,
    to: Option<CurrencyCode>,
) -> Result<()> {
    if let Some(from) = from {
        view_model.set_source_currency(from);
    }
    if let Some(to) = to {
        view_model.set_target_currency(to);
    }
    view_model.set_amount_text(amount);

    let source = view_model.snapshot().source_currency;
    let pb = ui::new_spinner(format!("Fetching {source} rates..."));
    let outcome = view_model.convert().await;
    pb.finish_and_clear();

    match outcome {
        ConversionOutcome::Converted { .. } => {
            println!("{}", view_model.snapshot().display_as_table());
            Ok(())
        }
        ConversionOutcome::Rejected(e) | ConversionOutcome::Failed(e) => {
            eprintln!("{}", ui::style_text(&e.to_string(), ui::StyleType::Error));
            Err(e.into())
        }
        ConversionOutcome::Superseded => Err(anyhow!("Conversion was superseded")),
    }
}
