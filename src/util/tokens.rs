//

use crate::core::error::{Error, Result};

// the C locale's isspace set; U+00A0 and friends do not count
fn is_space(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | 0x0b | 0x0c | b'\r')
}

/// Integer tokens of one input line.
///
/// Each token is optional whitespace, an optional sign and decimal digits.
/// The stream ends at the first position where no such token starts, so
/// `"10 x 20"` yields only `10`. A token outside `i64` is an error and also
/// ends the stream. The line is raw bytes; anything that is not ASCII simply
/// ends the stream like any other non-numeric byte.
pub struct Tokens<'a> {
    rest: &'a [u8],
    done: bool,
}

impl<'a> Tokens<'a> {
    pub fn new(line: &'a [u8]) -> Self {
        Tokens {
            rest: line,
            done: false,
        }
    }

    fn parse_next(&mut self) -> Option<Result<i64>> {
        let start = self.rest.iter().take_while(|&&byte| is_space(byte)).count();
        let trimmed = &self.rest[start..];
        let (negative, sign_len) = match trimmed.first() {
            Some(b'-') => (true, 1),
            Some(b'+') => (false, 1),
            _ => (false, 0),
        };
        let digits_len = trimmed[sign_len..]
            .iter()
            .take_while(|byte| byte.is_ascii_digit())
            .count();
        if digits_len == 0 {
            return None;
        }
        let (token, rest) = trimmed.split_at(sign_len + digits_len);
        self.rest = rest;

        // accumulate towards the sign so i64::MIN fits
        let mut value: i64 = 0;
        for &digit in &token[sign_len..] {
            let digit = i64::from(digit - b'0');
            let next = value.checked_mul(10).and_then(|value| {
                if negative {
                    value.checked_sub(digit)
                } else {
                    value.checked_add(digit)
                }
            });
            match next {
                Some(next) => value = next,
                None => {
                    return Some(Err(Error::InputOverflow {
                        token: String::from_utf8_lossy(token).into_owned(),
                    }))
                }
            }
        }
        Some(Ok(value))
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Result<i64>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = self.parse_next();
        match item {
            Some(Ok(_)) => {}
            _ => self.done = true,
        }
        item
    }
}
