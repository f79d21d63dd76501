pub mod claims;
pub mod stats;
pub mod sweeper;
