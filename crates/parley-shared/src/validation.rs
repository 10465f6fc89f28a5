use std::sync::OnceLock;

use regex::Regex;

use crate::constants::USERNAME_PATTERN;

fn username_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(USERNAME_PATTERN).expect("username pattern is valid"))
}

/// Display names are 3 to 16 ASCII letters or digits.
pub fn is_valid_username(name: &str) -> bool {
    username_regex().is_match(name)
}
