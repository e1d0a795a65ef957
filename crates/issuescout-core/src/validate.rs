// Input validation for user-supplied values
use crate::{Error, Result};

/// Validate a GitHub username before it goes into a URL path.
///
/// GitHub's rules: 1 to 39 characters, alphanumeric or hyphen, and the
/// first and last characters must be alphanumeric. Returns the trimmed
/// username on success.
pub fn validate_username(username: &str) -> Result<&str> {
    let trimmed = username.trim();

    if trimmed.is_empty() {
        return Err(Error::InvalidUsername("Username is empty".to_string()));
    }
    if trimmed.len() > 39 {
        return Err(Error::InvalidUsername(format!(
            "Username is too long ({} characters, max 39)",
            trimmed.len()
        )));
    }
    if !trimmed.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(Error::InvalidUsername(
            "Username may only contain letters, digits and hyphens".to_string(),
        ));
    }

    let first = trimmed.chars().next().expect("non-empty");
    let last = trimmed.chars().last().expect("non-empty");
    if !first.is_ascii_alphanumeric() || !last.is_ascii_alphanumeric() {
        return Err(Error::InvalidUsername(
            "Username cannot start or end with a hyphen".to_string(),
        ));
    }

    Ok(trimmed)
}

/// Strip the characters we never want to forward inside a free-text
/// search term, and cap the length GitHub would reject anyway.
pub fn sanitize_search_query(query: &str) -> String {
    let mut cleaned: String = query.chars().filter(|c| *c != '<' && *c != '>').collect();

    // Case-insensitive removal of the scheme, not just the exact string
    loop {
        let lower = cleaned.to_lowercase();
        match lower.find("javascript:") {
            Some(pos) => {
                cleaned.replace_range(pos..pos + "javascript:".len(), "");
            }
            None => break,
        }
    }

    cleaned.trim().chars().take(500).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ordinary_usernames() {
        assert_eq!(validate_username("octocat").unwrap(), "octocat");
        assert_eq!(validate_username("a").unwrap(), "a");
        assert_eq!(validate_username("  rust-lang  ").unwrap(), "rust-lang");
        assert_eq!(validate_username("user123").unwrap(), "user123");
    }

    #[test]
    fn rejects_bad_usernames() {
        assert!(validate_username("").is_err());
        assert!(validate_username("   ").is_err());
        assert!(validate_username("-leading").is_err());
        assert!(validate_username("trailing-").is_err());
        assert!(validate_username("has space").is_err());
        assert!(validate_username("emoji🎉").is_err());
        assert!(validate_username(&"a".repeat(40)).is_err());
        assert!(validate_username(&"a".repeat(39)).is_ok());
    }

    #[test]
    fn sanitizer_strips_markup_and_schemes() {
        assert_eq!(sanitize_search_query("<script>alert(1)</script>"), "scriptalert(1)/script");
        assert_eq!(sanitize_search_query("JavaScript:evil()"), "evil()");
        assert_eq!(sanitize_search_query("  memory leak  "), "memory leak");
    }

    #[test]
    fn sanitizer_caps_length() {
        let long = "a".repeat(600);
        assert_eq!(sanitize_search_query(&long).len(), 500);
    }
}
