//! Language detection by character composition.

/// The two language families the bot distinguishes. Fixed texts
/// (disclaimer, busy, off-topic) exist in exactly these two variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lang {
    English,
    Other,
}

/// Classify a message as primarily-English or primarily-other.
///
/// English iff the ratio of ASCII letters to total characters exceeds 0.5.
/// The denominator has a floor of 1 so empty input is well-defined.
pub fn detect(text: &str) -> Lang {
    let total = text.chars().count().max(1);
    let letters = text.chars().filter(char::is_ascii_alphabetic).count();

    if letters as f64 / total as f64 > 0.5 {
        Lang::English
    } else {
        Lang::Other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn english_majority_is_english() {
        assert_eq!(detect("How do I enroll in FBA?"), Lang::English);
    }

    #[test]
    fn chinese_majority_is_other() {
        assert_eq!(detect("如何加入FBA計畫？"), Lang::Other);
    }

    #[test]
    fn exactly_half_is_not_english() {
        // 2 letters out of 4 chars: the ratio must strictly exceed 0.5.
        assert_eq!(detect("ab你好"), Lang::Other);
    }

    #[test]
    fn empty_input_is_other() {
        assert_eq!(detect(""), Lang::Other);
    }

    #[test]
    fn digits_and_punctuation_do_not_count_as_letters() {
        assert_eq!(detect("12345!"), Lang::Other);
    }
}
