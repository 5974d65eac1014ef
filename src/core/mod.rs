pub mod cortex;
pub mod scheduler;
pub mod state;
