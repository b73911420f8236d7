pub mod app;
pub mod edit;
pub mod focus;
pub mod handlers;
pub mod theme;
pub mod ui;
