//! Route access policy.
//!
//! The quiz is open to anonymous visitors; the dashboard needs a session; a
//! signed-in user who wanders anywhere else is sent to the dashboard.
//! Anything left is denied, which the HTTP layer turns into a redirect to the
//! sign-in page.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Allow,
    Redirect(String),
    Deny,
}

#[derive(Debug, Clone)]
pub struct GateConfig {
    quiz_prefix: String,
    dashboard_prefix: String,
    sign_in_path: String,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            quiz_prefix: "/quiz".to_string(),
            dashboard_prefix: "/dashboard".to_string(),
            sign_in_path: "/".to_string(),
        }
    }
}

impl GateConfig {
    #[must_use]
    pub fn new(quiz_prefix: &str, dashboard_prefix: &str, sign_in_path: &str) -> Self {
        Self {
            quiz_prefix: quiz_prefix.to_string(),
            dashboard_prefix: dashboard_prefix.to_string(),
            sign_in_path: sign_in_path.to_string(),
        }
    }

    #[must_use]
    pub fn sign_in_path(&self) -> &str {
        &self.sign_in_path
    }

    /// Paths allowed whatever the session says.
    #[must_use]
    pub fn is_open(&self, path: &str) -> bool {
        path.starts_with(&self.quiz_prefix)
    }

    /// First match wins.
    #[must_use]
    pub fn decide(&self, path: &str, has_session: bool) -> Access {
        if self.is_open(path) {
            Access::Allow
        } else if path.starts_with(&self.dashboard_prefix) && has_session {
            Access::Allow
        } else if has_session {
            Access::Redirect(self.dashboard_prefix.clone())
        } else {
            Access::Deny
        }
    }
}

/// [`GateConfig::decide`] with the default prefixes.
#[must_use]
pub fn decide(path: &str, has_session: bool) -> Access {
    GateConfig::default().decide(path, has_session)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiz_is_always_open() {
        assert_eq!(decide("/quiz", false), Access::Allow);
        assert_eq!(decide("/quiz/answer", false), Access::Allow);
        assert_eq!(decide("/quiz", true), Access::Allow);
    }

    #[test]
    fn dashboard_needs_a_session() {
        assert_eq!(decide("/dashboard", true), Access::Allow);
        assert_eq!(decide("/dashboard/settings", true), Access::Allow);
        assert_eq!(decide("/dashboard", false), Access::Deny);
    }

    #[test]
    fn signed_in_elsewhere_goes_to_dashboard() {
        assert_eq!(
            decide("/pricing", true),
            Access::Redirect("/dashboard".to_string())
        );
    }

    #[test]
    fn anonymous_elsewhere_is_denied() {
        assert_eq!(decide("/pricing", false), Access::Deny);
        assert_eq!(decide("/", false), Access::Deny);
    }

    #[test]
    fn prefix_match_is_literal() {
        // `/quizzes` starts with `/quiz`, so it is open as well.
        assert_eq!(decide("/quizzes", false), Access::Allow);
        assert_eq!(decide("/dash", true), Access::Redirect("/dashboard".to_string()));
    }

    #[test]
    fn only_the_quiz_is_open() {
        let gate = GateConfig::default();
        assert!(gate.is_open("/quiz"));
        assert!(gate.is_open("/quiz/lead"));
        assert!(!gate.is_open("/dashboard"));
        assert!(!gate.is_open("/"));
    }

    #[test]
    fn custom_prefixes() {
        let gate = GateConfig::new("/q", "/app", "/login");
        assert_eq!(gate.decide("/q/1", false), Access::Allow);
        assert_eq!(gate.decide("/app", true), Access::Allow);
        assert_eq!(gate.decide("/other", true), Access::Redirect("/app".to_string()));
        assert_eq!(gate.sign_in_path(), "/login");
    }
}
