pub mod app;
pub mod blob_widget;
pub mod events;
pub mod ui;
