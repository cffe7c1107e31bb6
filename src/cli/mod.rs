pub mod chart;
pub mod forecast;
pub mod history;
pub mod rates;
pub mod setup;
pub mod ui;
