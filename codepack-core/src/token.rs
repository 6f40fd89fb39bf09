//! Token conventions shared by the packer and the masker

use regex::Regex;
use std::sync::OnceLock;

static LETTERS: OnceLock<Regex> = OnceLock::new();

/// A single vocabulary entry produced by the tokenizer
pub type Token = String;

/// Prefix marking a token as the continuation of the preceding word
pub const CONTINUATION_PREFIX: &str = "##";

/// Marker opening every framed sequence
pub const CLS: &str = "[CLS]";

/// Marker closing each segment of a framed sequence
pub const SEP: &str = "[SEP]";

/// Replacement used for masked positions
pub const MASK: &str = "[MASK]";

/// Check whether `token` is a continuation fragment
///
/// A continuation fragment starts with [`CONTINUATION_PREFIX`], is longer
/// than the prefix, and everything from its fourth character onward is
/// non-empty and made of letters (Unicode categories `L*`). Letter-like
/// numerals such as `Ⅻ` and combining marks do not count. The third
/// character is not inspected, so `"##ab"` is a fragment while `"##a"` and
/// `"##a1"` are not.
pub fn is_continuation(token: &str) -> bool {
    let Some(rest) = token.strip_prefix(CONTINUATION_PREFIX) else {
        return false;
    };

    let mut chars = rest.chars();
    if chars.next().is_none() {
        return false;
    }

    LETTERS
        .get_or_init(|| Regex::new(r"^\p{L}+$").expect("letter pattern should compile"))
        .is_match(chars.as_str())
}

/// Number of framing markers around a description/body pair
///
/// `[CLS] description [SEP] body [SEP]` when a description exists,
/// `[CLS] body [SEP]` otherwise.
pub fn special_token_count(has_description: bool) -> usize {
    if has_description {
        3
    } else {
        2
    }
}

/// Build the framed sequence `[CLS] description [SEP]? body [SEP]`
pub fn frame<T: AsRef<str>>(description: &[T], body: &[T]) -> Vec<Token> {
    let mut framed = Vec::with_capacity(
        description.len() + body.len() + special_token_count(!description.is_empty()),
    );

    framed.push(CLS.to_string());
    if !description.is_empty() {
        framed.extend(description.iter().map(|t| t.as_ref().to_string()));
        framed.push(SEP.to_string());
    }
    framed.extend(body.iter().map(|t| t.as_ref().to_string()));
    framed.push(SEP.to_string());

    framed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_continuation_requires_prefix() {
        assert!(!is_continuation("abc"));
        assert!(!is_continuation("#abc"));
        assert!(!is_continuation(""));
    }

    #[test]
    fn test_continuation_skips_third_character() {
        assert!(is_continuation("##ab"));
        assert!(is_continuation("##1ab"));
        assert!(is_continuation("##ing"));
        assert!(!is_continuation("##"));
        assert!(!is_continuation("##a"));
        assert!(!is_continuation("##a1"));
        assert!(!is_continuation("##ab_"));
    }

    #[test]
    fn test_continuation_accepts_unicode_letters() {
        assert!(is_continuation("##xé"));
        assert!(is_continuation("##x日本"));
        assert!(!is_continuation("##x日本1"));
    }

    #[test]
    fn test_continuation_rejects_non_letter_alphabetics() {
        // Letter numbers and combining marks are alphabetic but not letters.
        assert!("Ⅻ".chars().all(char::is_alphabetic));
        assert!(!is_continuation("##xⅫ"));
        assert!(!is_continuation("##xa\u{0345}"));
        assert!(is_continuation("##xǅ"));
    }

    #[test]
    fn test_special_token_count() {
        assert_eq!(special_token_count(true), 3);
        assert_eq!(special_token_count(false), 2);
    }

    #[test]
    fn test_frame_with_description() {
        let framed = frame(&["sum", "two"], &["return", "a"]);
        assert_eq!(
            framed,
            vec!["[CLS]", "sum", "two", "[SEP]", "return", "a", "[SEP]"]
        );
    }

    #[test]
    fn test_frame_without_description() {
        let empty: [&str; 0] = [];
        let framed = frame(&empty, &["pass"]);
        assert_eq!(framed, vec!["[CLS]", "pass", "[SEP]"]);
    }
}
