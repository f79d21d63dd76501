pub mod claim_code;
pub mod expiry_sweeper;
