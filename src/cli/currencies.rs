use super::ui;
use crate::core::{ConversionState, CurrencyCode};
use comfy_table::Cell;

/// Renders the configured currency choices, marking the current selection.
pub fn display_as_table(currencies: &[CurrencyCode], state: &ConversionState) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Currency"), ui::header_cell("Selected")]);

    for code in currencies {
        let selected = match (
            *code == state.source_currency,
            *code == state.target_currency,
        ) {
            (true, true) => "from, to",
            (true, false) => "from",
            (false, true) => "to",
            (false, false) => "",
        };
        table.add_row(vec![Cell::new(code.as_str()), Cell::new(selected)]);
    }

    table.to_string()
}

pub fn run(currencies: &[CurrencyCode], state: &ConversionState) {
    println!("{}", display_as_table(currencies, state));
}
