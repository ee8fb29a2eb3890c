pub mod analysis;
pub mod api;
pub mod core;
