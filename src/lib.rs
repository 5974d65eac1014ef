pub mod core;
pub mod errors;
pub mod io;
pub mod tui;
pub mod visual;
