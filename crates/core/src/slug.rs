//! URL slugs for categories and articles.

/// Lowercase ASCII slug: letters and digits kept, every other run of
/// characters collapsed to a single `-`, no leading or trailing `-`.
///
/// ```rust
/// # use freshwater_core::slug::slugify;
/// assert_eq!(slugify("Tetras & Barbs"), "tetras-barbs");
/// ```
#[must_use]
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;
    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// Whether `s` is already a valid slug.
#[must_use]
pub fn is_slug(s: &str) -> bool {
    !s.is_empty() && slugify(s) == s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Catfish & Bottom Dwellers"), "catfish-bottom-dwellers");
        assert_eq!(slugify("  Goldfish & Koi!  "), "goldfish-koi");
        assert_eq!(slugify("pH 101"), "ph-101");
        assert_eq!(slugify("---"), "");
    }

    #[test]
    fn test_is_slug() {
        assert!(is_slug("water-chemistry"));
        assert!(!is_slug("Water Chemistry"));
        assert!(!is_slug("trailing-"));
        assert!(!is_slug(""));
    }
}
