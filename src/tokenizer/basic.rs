// basic.rs - Coarse BERT tokenization: cleaning, CJK spacing, whitespace and
// punctuation splitting, optional lowercasing with accent stripping.

use unicode_general_category::{get_general_category, GeneralCategory};
use unicode_normalization::UnicodeNormalization;

use super::WordTokenizer;

/// Splits raw text into word and punctuation tokens.
#[derive(Debug, Clone)]
pub struct BasicTokenizer {
    lowercase: bool,
}

impl BasicTokenizer {
    pub fn new(lowercase: bool) -> Self {
        Self { lowercase }
    }
}

impl Default for BasicTokenizer {
    fn default() -> Self {
        Self::new(true)
    }
}

impl WordTokenizer for BasicTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        let cleaned = clean_text(text);
        let spaced = pad_cjk_chars(&cleaned);

        let mut split_tokens = Vec::new();
        for word in spaced.split_whitespace() {
            if self.lowercase {
                let lowered = strip_accents(&word.to_lowercase());
                split_tokens.extend(split_on_punctuation(&lowered));
            } else {
                split_tokens.extend(split_on_punctuation(word));
            }
        }

        // Re-split on whitespace to flatten.
        split_tokens
            .join(" ")
            .split_whitespace()
            .map(str::to_string)
            .collect()
    }
}

/// Drop NUL, U+FFFD and control characters; map every whitespace char to ' '.
fn clean_text(text: &str) -> String {
    text.chars()
        .filter(|&c| c != '\0' && c != char::REPLACEMENT_CHARACTER && !is_control(c))
        .map(|c| if c.is_whitespace() { ' ' } else { c })
        .collect()
}

/// Surround every CJK ideograph with spaces so each becomes its own word.
fn pad_cjk_chars(text: &str) -> String {
    let mut output = String::with_capacity(text.len());
    for c in text.chars() {
        if is_cjk_char(c) {
            output.push(' ');
            output.push(c);
            output.push(' ');
        } else {
            output.push(c);
        }
    }
    output
}

/// NFD-decompose, then drop nonspacing marks.
fn strip_accents(text: &str) -> String {
    text.nfd()
        .filter(|&c| !matches!(get_general_category(c), GeneralCategory::NonspacingMark))
        .collect()
}

/// Every punctuation char becomes its own token; other runs stay joined.
fn split_on_punctuation(word: &str) -> Vec<String> {
    let mut output = Vec::new();
    let mut current = String::new();

    for c in word.chars() {
        if is_punctuation(c) {
            if !current.is_empty() {
                output.push(std::mem::take(&mut current));
            }
            output.push(c.to_string());
        } else {
            current.push(c);
        }
    }
    if !current.is_empty() {
        output.push(current);
    }

    output
}

// Tab, newline and carriage return count as whitespace, not control.
fn is_control(c: char) -> bool {
    if matches!(c, '\t' | '\n' | '\r') {
        return false;
    }
    matches!(
        get_general_category(c),
        GeneralCategory::Control | GeneralCategory::Format
    )
}

/// All non-alphanumeric printable ASCII counts as punctuation, even chars like
/// `^`, `$` and `` ` `` that Unicode files under symbols.
fn is_punctuation(c: char) -> bool {
    let cp = c as u32;
    if (33..=47).contains(&cp)
        || (58..=64).contains(&cp)
        || (91..=96).contains(&cp)
        || (123..=126).contains(&cp)
    {
        return true;
    }
    matches!(
        get_general_category(c),
        GeneralCategory::ConnectorPunctuation
            | GeneralCategory::DashPunctuation
            | GeneralCategory::OpenPunctuation
            | GeneralCategory::ClosePunctuation
            | GeneralCategory::InitialPunctuation
            | GeneralCategory::FinalPunctuation
            | GeneralCategory::OtherPunctuation
    )
}

// CJK Unified Ideographs blocks only; Hangul and kana are not included.
fn is_cjk_char(c: char) -> bool {
    let cp = c as u32;
    (0x4E00..=0x9FFF).contains(&cp)
        || (0x3400..=0x4DBF).contains(&cp)
        || (0x20000..=0x2A6DF).contains(&cp)
        || (0x2A700..=0x2B73F).contains(&cp)
        || (0x2B740..=0x2B81F).contains(&cp)
        || (0x2B820..=0x2CEAF).contains(&cp)
        || (0xF900..=0xFAFF).contains(&cp)
        || (0x2F800..=0x2FA1F).contains(&cp)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(tokenizer: &BasicTokenizer, text: &str) -> Vec<String> {
        tokenizer.tokenize(text)
    }

    #[test]
    fn test_lowercase_and_split() {
        let t = BasicTokenizer::new(true);
        assert_eq!(
            tokens(&t, "This is an example sentence"),
            vec!["this", "is", "an", "example", "sentence"]
        );
    }

    #[test]
    fn test_punctuation_becomes_own_token() {
        let t = BasicTokenizer::new(true);
        assert_eq!(tokens(&t, "Hello, World!"), vec!["hello", ",", "world", "!"]);
        assert_eq!(tokens(&t, "a...b"), vec!["a", ".", ".", ".", "b"]);
    }

    #[test]
    fn test_ascii_symbols_count_as_punctuation() {
        let t = BasicTokenizer::new(false);
        assert_eq!(tokens(&t, "x^y$z`"), vec!["x", "^", "y", "$", "z", "`"]);
    }

    #[test]
    fn test_unicode_punctuation() {
        let t = BasicTokenizer::new(true);
        assert_eq!(tokens(&t, "\u{00BF}que?"), vec!["\u{00BF}", "que", "?"]);
        assert_eq!(tokens(&t, "a\u{2014}b"), vec!["a", "\u{2014}", "b"]);
    }

    #[test]
    fn test_accent_stripping_when_lowercasing() {
        let t = BasicTokenizer::new(true);
        assert_eq!(tokens(&t, "Caf\u{00E9} na\u{00EF}ve"), vec!["cafe", "naive"]);
    }

    #[test]
    fn test_case_and_accents_kept_without_lowercasing() {
        let t = BasicTokenizer::new(false);
        assert_eq!(tokens(&t, "Caf\u{00E9}"), vec!["Caf\u{00E9}"]);
    }

    #[test]
    fn test_cjk_chars_split() {
        let t = BasicTokenizer::new(true);
        assert_eq!(
            tokens(&t, "ab\u{4E2D}\u{6587}cd"),
            vec!["ab", "\u{4E2D}", "\u{6587}", "cd"]
        );
    }

    #[test]
    fn test_cjk_supplementary_and_compatibility_ranges() {
        let t = BasicTokenizer::new(false);
        assert_eq!(
            tokens(&t, "a\u{20000}b\u{F900}c"),
            vec!["a", "\u{20000}", "b", "\u{F900}", "c"]
        );
    }

    #[test]
    fn test_hangul_and_kana_not_split() {
        let t = BasicTokenizer::new(false);
        assert_eq!(tokens(&t, "ab\u{D55C}\u{3042}cd"), vec!["ab\u{D55C}\u{3042}cd"]);
    }

    #[test]
    fn test_control_chars_dropped_and_whitespace_collapsed() {
        let t = BasicTokenizer::new(true);
        // U+200B is a format char, so it is removed rather than split on.
        assert_eq!(
            tokens(&t, "a\u{0007}b\tc\n\r d\u{FFFD}e\u{0000}f\u{200B}g"),
            vec!["ab", "c", "defg"]
        );
    }

    #[test]
    fn test_empty_and_whitespace_only() {
        let t = BasicTokenizer::new(true);
        assert!(tokens(&t, "").is_empty());
        assert!(tokens(&t, " \t\n  ").is_empty());
    }

    #[test]
    fn test_deterministic() {
        let t = BasicTokenizer::new(true);
        let text = "Determinism, please: same input \u{2192} same output.";
        assert_eq!(tokens(&t, text), tokens(&t, text));
    }
}
