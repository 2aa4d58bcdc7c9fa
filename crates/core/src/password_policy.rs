//! Password strength rules applied at registration and password change.
//!
//! Three rules run in order and every failing rule contributes a message:
//! minimum length, membership in the common-password list, and being made
//! of digits only.

use std::collections::HashSet;
use std::sync::LazyLock;

/// Minimum accepted password length, in characters.
pub const MIN_PASSWORD_LENGTH: usize = 8;

pub const TOO_COMMON: &str = "This password is too common.";
pub const ENTIRELY_NUMERIC: &str = "This password is entirely numeric.";
pub const MISMATCH: &str = "Password fields do not match.";
pub const SAME_AS_CURRENT: &str = "New password should differ from the current one.";
pub const WRONG_CURRENT: &str = "Invalid password.";

static COMMON_PASSWORDS: LazyLock<HashSet<String>> = LazyLock::new(|| {
    include_str!("common_passwords.txt")
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_lowercase)
        .collect()
});

/// `This password is too short. It must contain at least <n> characters.`
pub fn too_short(min: usize) -> String {
    format!("This password is too short. It must contain at least {min} characters.")
}

/// Check a candidate password against every strength rule.
///
/// Returns the messages of all failing rules; an empty vector means the
/// password is acceptable.
pub fn check_strength(password: &str) -> Vec<String> {
    let mut failures = Vec::new();

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        failures.push(too_short(MIN_PASSWORD_LENGTH));
    }
    if is_common(password) {
        failures.push(TOO_COMMON.to_string());
    }
    if !password.is_empty() && password.chars().all(|c| c.is_ascii_digit()) {
        failures.push(ENTIRELY_NUMERIC.to_string());
    }

    failures
}

/// Whether the password appears in the common-password list.
pub fn is_common(password: &str) -> bool {
    COMMON_PASSWORDS.contains(&password.trim().to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strong_password_passes() {
        assert!(check_strength("StrongPassword1!").is_empty());
    }

    #[test]
    fn numeric_password_rejected() {
        let failures = check_strength("93825647895217321596227862362245821005");
        assert_eq!(failures, vec![ENTIRELY_NUMERIC.to_string()]);
    }

    #[test]
    fn short_password_rejected() {
        let failures = check_strength("strpas1");
        assert_eq!(
            failures,
            vec!["This password is too short. It must contain at least 8 characters.".to_string()]
        );
    }

    #[test]
    fn common_password_rejected_case_insensitively() {
        assert_eq!(check_strength("password"), vec![TOO_COMMON.to_string()]);
        assert_eq!(check_strength("PassWord"), vec![TOO_COMMON.to_string()]);
    }

    #[test]
    fn all_failing_rules_are_reported() {
        // Short, common, and numeric at once.
        let failures = check_strength("123456");
        assert_eq!(failures.len(), 3);
        assert_eq!(failures[1], TOO_COMMON);
        assert_eq!(failures[2], ENTIRELY_NUMERIC);
    }

    #[test]
    fn comment_lines_are_not_passwords() {
        assert!(!is_common("# Frequently used passwords rejected at registration and password change."));
    }
}
