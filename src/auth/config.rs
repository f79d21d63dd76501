use dotenvy::var;

#[derive(Clone)]
pub struct SessionJwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub expiry_secs: u64,
    pub dev_bypass_token: Option<String>,
}

impl SessionJwtConfig {
    pub fn from_env() -> Result<Self, String> {
        let secret =
            var("SESSION_JWT_SECRET").map_err(|_| "SESSION_JWT_SECRET must be set".to_string())?;
        let issuer = var("SESSION_JWT_ISSUER").unwrap_or_else(|_| "campus-auth".to_string());
        let audience = var("SESSION_JWT_AUDIENCE").unwrap_or_else(|_| "campus-meals".to_string());
        // 12 hours, matching one campus working day
        let expiry_secs = var("SESSION_JWT_EXPIRY_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(12 * 60 * 60);
        let dev_bypass_token = var("DEV_BYPASS_TOKEN").ok().filter(|v| !v.trim().is_empty());
        if dev_bypass_token.is_some() {
            warn!("DEV_BYPASS_TOKEN is set; identities can be chosen with ?as=<role>-<id>");
        }
        Ok(Self {
            secret,
            issuer,
            audience,
            expiry_secs,
            dev_bypass_token,
        })
    }
}
