//! # Numeric Entry
//!
//! Counting screens are free-form text fields. Clearing a field or typing
//! something that is not a count must never fail; it simply means zero.
//!
//! ## Coercion Rules
//! | Text          | Count |
//! |---------------|-------|
//! | `""`          | 0     |
//! | `"  12 "`     | 12    |
//! | `"-4"`        | 0     |
//! | `"3.5"`       | 0     |
//! | `"abc"`       | 0     |
//! | `"99999999999"` (overflow) | 0 |

/// Parses a free-form count, coercing anything that is not a non-negative
/// integer to zero.
///
/// ## Example
/// ```rust
/// use tally_core::input::parse_count;
///
/// assert_eq!(parse_count("42"), 42);
/// assert_eq!(parse_count(""), 0);
/// assert_eq!(parse_count("-1"), 0);
/// ```
pub fn parse_count(text: &str) -> u32 {
    text.trim().parse::<u32>().unwrap_or(0)
}

/// Renders a count for an entry field. Zero shows as an empty field so the
/// operator can start typing without deleting a placeholder `0`.
pub fn entry_text(count: u32) -> String {
    if count == 0 {
        String::new()
    } else {
        count.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count("0"), 0);
        assert_eq!(parse_count("17"), 17);
        assert_eq!(parse_count("  12 "), 12);
        assert_eq!(parse_count("+5"), 5);
    }

    #[test]
    fn test_parse_count_coerces_garbage_to_zero() {
        assert_eq!(parse_count(""), 0);
        assert_eq!(parse_count("   "), 0);
        assert_eq!(parse_count("-4"), 0);
        assert_eq!(parse_count("3.5"), 0);
        assert_eq!(parse_count("abc"), 0);
        assert_eq!(parse_count("99999999999"), 0);
    }

    #[test]
    fn test_entry_text() {
        assert_eq!(entry_text(0), "");
        assert_eq!(entry_text(25), "25");
    }
}
