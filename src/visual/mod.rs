pub mod blob;
pub mod params;
