//! Text decomposition
//!
//! Text is split into addressable segments before it enters the tree:
//! CJK ideographs become single-code-point segments (vertical text and
//! grid alignment need per-glyph addressing), everything else word
//! segments. Whitespace separates words and is not emitted; text marked
//! `xml:space="preserve"` swaps its spaces for no-break spaces first,
//! which keeps them inside the word segments.

const NBSP: char = '\u{00A0}';

/// Whether a code point needs single-glyph addressing.
fn is_cjk(c: char) -> bool {
    matches!(c,
        '\u{4E00}'..='\u{9FFF}'     // unified ideographs
        | '\u{3400}'..='\u{4DBF}'   // extension A
        | '\u{F900}'..='\u{FAFF}'   // compatibility ideographs
        | '\u{3040}'..='\u{30FF}'   // kana
        | '\u{FF00}'..='\u{FFEF}'   // full-width forms
    )
}

/// Whitespace for splitting purposes. The no-break space is exempt - that
/// is what makes the preserve-space substitution stick.
fn is_splitting_whitespace(c: char) -> bool {
    c.is_whitespace() && c != NBSP
}

/// Split text into segments: one per CJK code point, one per word
/// otherwise.
pub fn decompose(text: &str, preserve_space: bool) -> Vec<String> {
    let text: String = if preserve_space {
        text.chars().map(|c| if c == ' ' { NBSP } else { c }).collect()
    } else {
        text.to_string()
    };

    let mut segments = Vec::new();
    let mut word = String::new();
    for c in text.chars() {
        if is_splitting_whitespace(c) {
            if !word.is_empty() {
                segments.push(std::mem::take(&mut word));
            }
        } else if is_cjk(c) {
            if !word.is_empty() {
                segments.push(std::mem::take(&mut word));
            }
            segments.push(c.to_string());
        } else {
            word.push(c);
        }
    }
    if !word.is_empty() {
        segments.push(word);
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latin_words() {
        assert_eq!(decompose("hello world", false), vec!["hello", "world"]);
    }

    #[test]
    fn test_cjk_code_points_and_latin_words() {
        assert_eq!(decompose("你好world", false), vec!["你", "好", "world"]);
    }

    #[test]
    fn test_pure_cjk() {
        assert_eq!(decompose("你好", false), vec!["你", "好"]);
    }

    #[test]
    fn test_preserved_spaces_stay_inside_segments() {
        assert_eq!(decompose("a b", true), vec!["a\u{00A0}b"]);
        // Without preservation the space separates.
        assert_eq!(decompose("a b", false), vec!["a", "b"]);
    }

    #[test]
    fn test_whitespace_only_text() {
        assert!(decompose("   ", false).is_empty());
        assert!(decompose("", false).is_empty());
    }

    #[test]
    fn test_kana_counts_as_cjk() {
        assert_eq!(decompose("あa", false), vec!["あ", "a"]);
    }

    #[test]
    fn test_mixed_whitespace_and_cjk() {
        assert_eq!(
            decompose("one 二 three", false),
            vec!["one", "二", "three"]
        );
    }
}
