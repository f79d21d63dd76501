pub mod claim;
pub mod common;
pub mod donation;
pub mod food;
pub mod user;
