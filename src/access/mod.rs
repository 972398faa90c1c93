//! Route guard: one table decides every navigation.

use serde::Serialize;

pub const ROOT_PATH: &str = "/";
pub const LOGIN_PATH: &str = "/login";
pub const CHAT_PATH: &str = "/chat";
pub const PROFILE_PATH: &str = "/profile";

const PROTECTED_PREFIXES: [&str; 2] = [CHAT_PATH, PROFILE_PATH];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PathClass {
    Root,
    Login,
    Protected,
    Public,
}

impl PathClass {
    pub fn of(path: &str) -> Self {
        let path = normalize(path);
        if path == ROOT_PATH {
            Self::Root
        } else if path == LOGIN_PATH {
            Self::Login
        } else if PROTECTED_PREFIXES.iter().any(|prefix| {
            path == *prefix
                || path
                    .strip_prefix(prefix)
                    .is_some_and(|rest| rest.starts_with('/'))
        }) {
            Self::Protected
        } else {
            Self::Public
        }
    }
}

/// Strip query and fragment, collapse trailing slashes.
fn normalize(path: &str) -> &str {
    let path = path.split(['?', '#']).next().unwrap_or_default().trim();
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() { ROOT_PATH } else { trimmed }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum Decision {
    Allow,
    Redirect { target: &'static str },
}

struct Rule {
    /// `None` matches both states.
    authenticated: Option<bool>,
    class: PathClass,
    decision: Decision,
}

const RULES: [Rule; 7] = [
    Rule {
        authenticated: Some(true),
        class: PathClass::Root,
        decision: Decision::Redirect { target: CHAT_PATH },
    },
    Rule {
        authenticated: Some(false),
        class: PathClass::Root,
        decision: Decision::Redirect { target: LOGIN_PATH },
    },
    Rule {
        authenticated: Some(true),
        class: PathClass::Login,
        decision: Decision::Redirect { target: CHAT_PATH },
    },
    Rule {
        authenticated: Some(false),
        class: PathClass::Login,
        decision: Decision::Allow,
    },
    Rule {
        authenticated: Some(true),
        class: PathClass::Protected,
        decision: Decision::Allow,
    },
    Rule {
        authenticated: Some(false),
        class: PathClass::Protected,
        decision: Decision::Redirect { target: LOGIN_PATH },
    },
    Rule {
        authenticated: None,
        class: PathClass::Public,
        decision: Decision::Allow,
    },
];

/// Decide a navigation to `path` for a principal in the given auth state.
pub fn decide(authenticated: bool, path: &str) -> Decision {
    let class = PathClass::of(path);
    RULES
        .iter()
        .find(|rule| rule.class == class && rule.authenticated.is_none_or(|a| a == authenticated))
        .map_or(Decision::Allow, |rule| rule.decision)
}
