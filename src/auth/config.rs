use url::Url;

const DEFAULT_SESSION_TTL_SECONDS: i64 = 12 * 60 * 60;
const DEFAULT_LANDING_PATH: &str = "/quiz";

#[derive(Clone, Debug)]
pub struct AuthConfig {
    base_url: String,
    landing_path: String,
    session_ttl_seconds: i64,
    session_cookie_secure: bool,
}

impl AuthConfig {
    #[must_use]
    pub fn new(base_url: String) -> Self {
        // Only mark cookies secure when the site is served over HTTPS.
        let session_cookie_secure = Url::parse(&base_url).is_ok_and(|url| url.scheme() == "https");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            landing_path: DEFAULT_LANDING_PATH.to_string(),
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
            session_cookie_secure,
        }
    }

    #[must_use]
    pub fn with_landing_path(mut self, landing_path: String) -> Self {
        self.landing_path = landing_path;
        self
    }

    #[must_use]
    pub fn with_session_ttl_seconds(mut self, seconds: i64) -> Self {
        self.session_ttl_seconds = seconds;
        self
    }

    /// Base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn landing_path(&self) -> &str {
        &self.landing_path
    }

    #[must_use]
    pub fn session_ttl_seconds(&self) -> i64 {
        self.session_ttl_seconds
    }

    #[must_use]
    pub fn session_cookie_secure(&self) -> bool {
        self.session_cookie_secure
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = AuthConfig::new("http://localhost:8080/".to_string());
        assert_eq!(config.base_url(), "http://localhost:8080");
        assert_eq!(config.landing_path(), "/quiz");
        assert_eq!(config.session_ttl_seconds(), 43_200);
        assert!(!config.session_cookie_secure());
    }

    #[test]
    fn https_marks_cookie_secure() {
        let config = AuthConfig::new("https://quizgate.dev".to_string())
            .with_landing_path("/dashboard".to_string());
        assert!(config.session_cookie_secure());
        assert_eq!(config.landing_path(), "/dashboard");
    }
}
