use std::env;
use std::str::FromStr;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_service_key: String,
    pub supabase_jwt_secret: String,
    pub redis_url: Option<String>,
    pub email_api_url: String,
    pub email_api_key: String,
    pub email_from: String,
    pub admin_email: String,
    pub night_shift_start_hour: u32,
    pub night_shift_end_hour: u32,
    pub night_shift_surcharge: String,
    pub external_timeout_secs: u64,
    pub slot_lock_ttl_secs: u64,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            supabase_url: env::var("SUPABASE_URL")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_URL not set, using in-memory storage");
                    String::new()
                }),
            supabase_service_key: env::var("SUPABASE_SERVICE_KEY")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_SERVICE_KEY not set, using empty value");
                    String::new()
                }),
            supabase_jwt_secret: env::var("SUPABASE_JWT_SECRET")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_JWT_SECRET not set, admin routes will reject every token");
                    String::new()
                }),
            redis_url: env::var("REDIS_URL").ok().filter(|url| !url.is_empty()),
            email_api_url: env::var("EMAIL_API_URL")
                .unwrap_or_else(|_| {
                    warn!("EMAIL_API_URL not set, notifications will only be logged");
                    String::new()
                }),
            email_api_key: env::var("EMAIL_API_KEY").unwrap_or_default(),
            email_from: env::var("EMAIL_FROM")
                .unwrap_or_else(|_| "reservas@localhost".to_string()),
            admin_email: env::var("ADMIN_EMAIL")
                .unwrap_or_else(|_| {
                    warn!("ADMIN_EMAIL not set, admin alerts are disabled");
                    String::new()
                }),
            night_shift_start_hour: parse_var("NIGHT_SHIFT_START_HOUR", 20),
            night_shift_end_hour: parse_var("NIGHT_SHIFT_END_HOUR", 24),
            night_shift_surcharge: env::var("NIGHT_SHIFT_SURCHARGE")
                .unwrap_or_else(|_| "20".to_string()),
            external_timeout_secs: parse_var("EXTERNAL_TIMEOUT_SECS", 10),
            slot_lock_ttl_secs: parse_var("SLOT_LOCK_TTL_SECS", 30),
            port: parse_var("PORT", 3000),
        };

        if !config.is_configured() {
            warn!("Supabase not configured - bookings are kept in memory only");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty() && !self.supabase_service_key.is_empty()
    }

    pub fn is_email_configured(&self) -> bool {
        !self.email_api_url.is_empty() && !self.email_api_key.is_empty()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            supabase_url: String::new(),
            supabase_service_key: String::new(),
            supabase_jwt_secret: String::new(),
            redis_url: None,
            email_api_url: String::new(),
            email_api_key: String::new(),
            email_from: "reservas@localhost".to_string(),
            admin_email: String::new(),
            night_shift_start_hour: 20,
            night_shift_end_hour: 24,
            night_shift_surcharge: "20".to_string(),
            external_timeout_secs: 10,
            slot_lock_ttl_secs: 30,
            port: 3000,
        }
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => parse_or(name, &raw, default),
        Err(_) => default,
    }
}

fn parse_or<T: FromStr>(name: &str, raw: &str, default: T) -> T {
    raw.trim().parse().unwrap_or_else(|_| {
        warn!("{} has invalid value '{}', using default", name, raw);
        default
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_or_accepts_valid_numbers() {
        assert_eq!(parse_or("PORT", " 8080 ", 3000u16), 8080);
        assert_eq!(parse_or("NIGHT_SHIFT_START_HOUR", "21", 20u32), 21);
    }

    #[test]
    fn test_parse_or_falls_back_on_garbage() {
        assert_eq!(parse_or("PORT", "not-a-port", 3000u16), 3000);
        assert_eq!(parse_or("EXTERNAL_TIMEOUT_SECS", "-5", 10u64), 10);
    }

    #[test]
    fn test_default_config_is_dev_mode() {
        let config = AppConfig::default();
        assert!(!config.is_configured());
        assert!(!config.is_email_configured());
        assert_eq!(config.night_shift_start_hour, 20);
        assert_eq!(config.night_shift_surcharge, "20");
    }
}
