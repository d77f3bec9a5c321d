use std::env;

/// Upload cap for /predict, matching the transport-level limit the
/// frontend expects (phone photos above this are rejected with 413).
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

const DEFAULT_ORIGINS: &str =
    "http://localhost:5500,http://127.0.0.1:5500,http://localhost:5000,http://127.0.0.1:5000";
const DEFAULT_PORT: u16 = 5000;

/// Cross-origin policy parsed from ALLOWED_ORIGINS. Any `*` entry switches
/// to wildcard mode, which also disables credentialed requests.
#[derive(Debug, Clone, PartialEq)]
pub enum CorsOrigins {
    Wildcard,
    List(Vec<String>),
}

impl CorsOrigins {
    pub fn parse(raw: &str) -> Self {
        let origins: Vec<String> = raw
            .split(',')
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect();

        if origins.iter().any(|o| o == "*") {
            CorsOrigins::Wildcard
        } else {
            CorsOrigins::List(origins)
        }
    }

    pub fn allow_credentials(&self) -> bool {
        matches!(self, CorsOrigins::List(_))
    }
}

/// Process-wide configuration, read from the environment once at start-up
/// and never mutated afterwards.
///
/// Only the classifier credential is mandatory for the predict flow; the
/// nutrition and generation credentials degrade their steps when absent.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub clarifai_pat: Option<String>,
    pub calorie_api_key: Option<String>,
    pub cohere_api_key: Option<String>,
    pub allowed_origins: CorsOrigins,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let allowed = env::var("ALLOWED_ORIGINS").unwrap_or_else(|_| DEFAULT_ORIGINS.to_string());

        Self {
            clarifai_pat: non_empty(env::var("CLARIFAI_PAT").ok()),
            calorie_api_key: non_empty(env::var("CALORIE_API_KEY").ok()),
            cohere_api_key: non_empty(env::var("COHERE_API_KEY").ok()),
            allowed_origins: CorsOrigins::parse(&allowed),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_PORT),
        }
    }
}

// An empty or blank variable counts as unset.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_origin_list() {
        let origins = CorsOrigins::parse("http://localhost:5500, http://127.0.0.1:5500");
        assert_eq!(
            origins,
            CorsOrigins::List(vec![
                "http://localhost:5500".to_string(),
                "http://127.0.0.1:5500".to_string(),
            ])
        );
        assert!(origins.allow_credentials());
    }

    #[test]
    fn wildcard_anywhere_in_list_wins() {
        let origins = CorsOrigins::parse("http://localhost:5500, * ,http://example.com");
        assert_eq!(origins, CorsOrigins::Wildcard);
        assert!(!origins.allow_credentials());
    }

    #[test]
    fn blank_entries_are_dropped() {
        let origins = CorsOrigins::parse("http://localhost:5500,, ");
        assert_eq!(
            origins,
            CorsOrigins::List(vec!["http://localhost:5500".to_string()])
        );
    }

    #[test]
    fn blank_credential_counts_as_unset() {
        assert_eq!(non_empty(Some("  ".to_string())), None);
        assert_eq!(non_empty(Some(String::new())), None);
        assert_eq!(non_empty(Some("key".to_string())), Some("key".to_string()));
        assert_eq!(non_empty(None), None);
    }
}
