pub mod common;
pub mod staff;
pub mod users;
