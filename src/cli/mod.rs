pub mod settings;
pub mod setup;
pub mod status;
pub mod ui;
