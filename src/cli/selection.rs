use super::ui;
use crate::core::ConversionState;

/// Prints the currency pair the converter starts with.
pub fn run(state: &ConversionState) {
    println!(
        "{} {} -> {}",
        ui::style_text("Last used:", ui::StyleType::Title),
        state.source_currency,
        state.target_currency
    );
}
