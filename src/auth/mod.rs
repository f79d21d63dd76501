pub mod config;
pub mod extractors;
pub mod middleware;
pub mod principal;
pub mod session_jwt;

pub use config::SessionJwtConfig;
pub use extractors::{Identity, StaffPrincipal, StudentPrincipal};
pub use middleware::AuthLayer;
pub use principal::Principal;
