//! One parsed line of G-code.

use heapless::String;

use crate::error::DecodeError;

use super::line::LINE_CAPACITY;

/// Letters that start a word (RS274/NGC, `N` included).
const WORD_LETTERS: &[u8] = b"ABCDFGHIJKLMNPQRSTUVWXYZ";

/// A line split into its code and comment parts.
///
/// The code part has spaces and tabs removed and letters upper-cased.
/// Parenthesis and semicolon comments are collected verbatim, in order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Block {
    code: String<LINE_CAPACITY>,
    comments: String<LINE_CAPACITY>,
    block_delete: bool,
}

impl Block {
    /// Split `line` into code and comments.
    ///
    /// A `)` only closes a parenthesis comment when no other `)` follows
    /// before the next `(`, so `(a) b)` is a single comment. Bytes outside
    /// ASCII are dropped from the code and shown as `?` in comments.
    ///
    /// # Errors
    ///
    /// Returns `LineOverflow` for lines longer than [`LINE_CAPACITY`].
    pub fn parse(line: &[u8]) -> Result<Self, DecodeError> {
        if line.len() > LINE_CAPACITY {
            return Err(DecodeError::LineOverflow {
                capacity: LINE_CAPACITY,
            });
        }

        let mut block = Block::default();
        let mut in_parens = false;
        let mut in_semicolon = false;

        for (i, &byte) in line.iter().enumerate() {
            match byte {
                b'(' => in_parens = true,
                b';' => in_semicolon = true,
                _ => {}
            }

            // Capacity was checked above, pushes cannot fail.
            if in_parens || in_semicolon {
                let c = if byte.is_ascii() { char::from(byte) } else { '?' };
                let _ = block.comments.push(c);
            } else if byte != b' ' && byte != b'\t' && byte.is_ascii() {
                let _ = block.code.push(char::from(byte.to_ascii_uppercase()));
            }

            if byte == b')' && in_parens {
                in_parens = line[i + 1..]
                    .iter()
                    .take_while(|&&c| c != b'(')
                    .any(|&c| c == b')');
            }
        }

        block.block_delete = block.code.starts_with('/');
        Ok(block)
    }

    /// Code part of the line.
    #[inline]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Comments of the line, concatenated.
    #[inline]
    pub fn comments(&self) -> &str {
        &self.comments
    }

    /// True for a line whose code starts with `/`.
    #[inline]
    pub fn is_block_delete(&self) -> bool {
        self.block_delete
    }

    /// True when the code part is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    /// Check whether `letter` can start a word.
    pub fn is_word_letter(letter: char) -> bool {
        letter.is_ascii() && WORD_LETTERS.contains(&(letter.to_ascii_uppercase() as u8))
    }

    /// Byte offset of the first `letter` in the code.
    pub fn find_word(&self, letter: char) -> Option<usize> {
        let letter = letter.to_ascii_uppercase();
        self.code.find(letter)
    }

    /// Check whether the code contains the word `letter`.
    pub fn has_word(&self, letter: char) -> bool {
        Self::is_word_letter(letter) && self.find_word(letter).is_some()
    }

    /// Number following the first `letter` in the code.
    ///
    /// Takes the longest decimal prefix (sign, digits, point, exponent).
    /// Returns `Ok(None)` when the word is absent.
    ///
    /// # Errors
    ///
    /// Returns `InvalidNumber` when no number follows the letter.
    pub fn value(&self, letter: char) -> Result<Option<f64>, DecodeError> {
        let Some(start) = self.find_word(letter) else {
            return Ok(None);
        };

        let rest = &self.code.as_bytes()[start + 1..];
        let len = numeric_prefix(rest);
        let letter = letter.to_ascii_uppercase();

        core::str::from_utf8(&rest[..len])
            .ok()
            .and_then(|s| s.parse::<f64>().ok())
            .map(Some)
            .ok_or(DecodeError::InvalidNumber(letter))
    }
}

/// Length of the decimal number at the start of `bytes`, 0 if none.
fn numeric_prefix(bytes: &[u8]) -> usize {
    let digits_from = |mut i: usize| {
        while bytes.get(i).is_some_and(u8::is_ascii_digit) {
            i += 1;
        }
        i
    };

    let mut i = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let int_end = digits_from(i);
    let mut digits = int_end - i;
    i = int_end;

    if bytes.get(i) == Some(&b'.') {
        let frac_end = digits_from(i + 1);
        digits += frac_end - (i + 1);
        i = frac_end;
    }

    if digits == 0 {
        return 0;
    }

    if matches!(bytes.get(i), Some(b'E' | b'e')) {
        let sign = usize::from(matches!(bytes.get(i + 1), Some(b'+' | b'-')));
        let exp_end = digits_from(i + 1 + sign);
        if exp_end > i + 1 + sign {
            i = exp_end;
        }
    }

    i
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(line: &str) -> Block {
        Block::parse(line.as_bytes()).unwrap()
    }

    #[test]
    fn test_paren_comment_and_tab() {
        let b = block("G01\t(Comment Here)Z0.0");
        assert_eq!(b.code(), "G01Z0.0");
        assert_eq!(b.comments(), "(Comment Here)");
        assert!(!b.is_block_delete());
    }

    #[test]
    fn test_semicolon_comment() {
        let b = block("M300 S125 ;Commet to end of line.");
        assert_eq!(b.code(), "M300S125");
        assert_eq!(b.comments(), ";Commet to end of line.");
    }

    #[test]
    fn test_nested_close_paren() {
        let b = block("G01 X3.2 Y1.5 (Comment) Here) Z5.0");
        assert_eq!(b.code(), "G01X3.2Y1.5Z5.0");
        assert_eq!(b.comments(), "(Comment) Here)");
    }

    #[test]
    fn test_two_comments() {
        let b = block("(one) G1 (two) X5");
        assert_eq!(b.code(), "G1X5");
        assert_eq!(b.comments(), "(one)(two)");
    }

    #[test]
    fn test_block_delete() {
        let b = block("/G21 (Block Delete)");
        assert!(b.is_block_delete());
        assert_eq!(b.code(), "/G21");

        assert!(!block("G21 /").is_block_delete());
    }

    #[test]
    fn test_lowercase_is_upper_cased() {
        let b = block("g1 x-2.5 y+4");
        assert_eq!(b.code(), "G1X-2.5Y+4");
        assert_eq!(b.value('x'), Ok(Some(-2.5)));
        assert_eq!(b.value('Y'), Ok(Some(4.0)));
    }

    #[test]
    fn test_word_letters() {
        assert!(Block::is_word_letter('G'));
        assert!(Block::is_word_letter('n'));
        assert!(!Block::is_word_letter('E'));
        assert!(!Block::is_word_letter('O'));
        assert!(!Block::is_word_letter('%'));
    }

    #[test]
    fn test_has_word() {
        let b = block("G01\t(Comment Here)Z0.0");
        assert!(b.has_word('G'));
        assert!(b.has_word('Z'));
        assert!(!b.has_word('M'));
        // Letters inside comments do not count.
        assert!(!b.has_word('C'));
        assert!(!b.has_word('H'));

        assert!(!Block::default().has_word('G'));
    }

    #[test]
    fn test_values() {
        let b = block("G01 X3.2 Y1.5 (Comment) Here) Z5.0");
        assert_eq!(b.value('G'), Ok(Some(1.0)));
        assert_eq!(b.value('X'), Ok(Some(3.2)));
        assert_eq!(b.value('Z'), Ok(Some(5.0)));
        assert_eq!(b.value('F'), Ok(None));

        let b = block("M300 S125");
        assert_eq!(b.value('M'), Ok(Some(300.0)));
        assert_eq!(b.value('S'), Ok(Some(125.0)));
    }

    #[test]
    fn test_number_forms() {
        assert_eq!(block("X.5").value('X'), Ok(Some(0.5)));
        assert_eq!(block("X7.").value('X'), Ok(Some(7.0)));
        assert_eq!(block("X1e2Y3").value('X'), Ok(Some(100.0)));
        assert_eq!(block("X2EY3").value('X'), Ok(Some(2.0)));
        assert_eq!(block("F-0.25").value('F'), Ok(Some(-0.25)));
    }

    #[test]
    fn test_missing_number() {
        assert_eq!(block("G1 X Y2").value('X'), Err(DecodeError::InvalidNumber('X')));
        assert_eq!(block("G1 X-").value('X'), Err(DecodeError::InvalidNumber('X')));
        assert_eq!(block("G1 X.").value('X'), Err(DecodeError::InvalidNumber('X')));
    }

    #[test]
    fn test_too_long() {
        let line = [b'X'; LINE_CAPACITY + 1];
        assert!(matches!(
            Block::parse(&line),
            Err(DecodeError::LineOverflow { .. })
        ));
    }
}
