pub mod convert;
pub mod currencies;
pub mod selection;
pub mod setup;
pub mod ui;
