// ABOUTME: Input validation for user accounts
// ABOUTME: Email format, unique-name length and avatar MIME type rules

use lazy_static::lazy_static;
use regex::Regex;

pub const UNIQUE_NAME_MIN_LEN: usize = 4;
pub const UNIQUE_NAME_MAX_LEN: usize = 20;

/// Largest accepted avatar upload
pub const MAX_AVATAR_BYTES: usize = 5 * 1024 * 1024;

lazy_static! {
    static ref EMAIL_REGEX: Regex =
        Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}$").unwrap();
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

pub fn is_valid_unique_name(unique_name: &str) -> bool {
    let len = unique_name.chars().count();
    (UNIQUE_NAME_MIN_LEN..=UNIQUE_NAME_MAX_LEN).contains(&len)
}

/// The part of an email address before `@`
pub fn email_local_part(email: &str) -> &str {
    email.split('@').next().unwrap_or(email)
}

/// File extension for a supported avatar content type, ignoring MIME parameters
pub fn avatar_extension(content_type: &str) -> Option<&'static str> {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    match mime.as_str() {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("alice@example.com", true)]
    #[case("a.b+tag@sub.example.org", true)]
    #[case("no-at-sign.example.com", false)]
    #[case("missing@tld", false)]
    #[case("spaces in@example.com", false)]
    #[case("", false)]
    fn test_email_validation(#[case] email: &str, #[case] valid: bool) {
        assert_eq!(is_valid_email(email), valid);
    }

    #[rstest]
    #[case("abc", false)]
    #[case("abcd", true)]
    #[case("twenty_characters_ok", true)]
    #[case("twenty_one_characters", false)]
    #[case("ñañá", true)]
    fn test_unique_name_length(#[case] name: &str, #[case] valid: bool) {
        assert_eq!(is_valid_unique_name(name), valid);
    }

    #[test]
    fn test_email_local_part() {
        assert_eq!(email_local_part("alice@example.com"), "alice");
        assert_eq!(email_local_part("bare"), "bare");
    }

    #[rstest]
    #[case("image/jpeg", Some("jpg"))]
    #[case("image/jpg", Some("jpg"))]
    #[case("IMAGE/PNG", Some("png"))]
    #[case("image/gif", Some("gif"))]
    #[case("image/webp; charset=binary", Some("webp"))]
    #[case("image/svg+xml", None)]
    #[case("application/octet-stream", None)]
    fn test_avatar_extension(#[case] content_type: &str, #[case] expected: Option<&str>) {
        assert_eq!(avatar_extension(content_type), expected);
    }
}
