pub mod donations;
pub mod food;
