pub mod environment;
pub mod events;
