use std::io::BufRead;

use bitvec::vec::BitVec;

use crate::DecodeError;

/// A supply of bits to decode.
///
/// `Ok(None)` is the end-of-stream signal. Once a source has returned it,
/// callers won't ask for more bits.
pub trait BitSource {
    fn next_bit(&mut self) -> Result<Option<bool>, DecodeError>;
}

/// Any iterator of bits is an infallible bit source. In particular, packed
/// bits can be decoded with `bit_slice.iter().by_vals()`.
impl<I: Iterator<Item = bool>> BitSource for I {
    fn next_bit(&mut self) -> Result<Option<bool>, DecodeError> {
        Ok(self.next())
    }
}

/// Bits spelled out as ASCII `'0'` and `'1'` characters.
///
/// The stream ends at the first line break (`'\n'` or `'\r'`), or at EOF.
/// The line break itself is consumed.
pub struct TextBits<R: BufRead> {
    input: R,

    /// Number of bytes consumed so far, for error messages.
    offset: u64,

    ended: bool,
}

impl<R: BufRead> TextBits<R> {
    pub fn new(input: R) -> Self {
        Self {
            input,
            offset: 0,
            ended: false,
        }
    }

    pub fn into_inner(self) -> R {
        self.input
    }
}

impl<R: BufRead> BitSource for TextBits<R> {
    fn next_bit(&mut self) -> Result<Option<bool>, DecodeError> {
        if self.ended {
            return Ok(None);
        }

        let Some(&byte) = self.input.fill_buf()?.first() else {
            self.ended = true;
            return Ok(None);
        };
        self.input.consume(1);
        let offset = self.offset;
        self.offset += 1;

        match byte {
            b'0' => Ok(Some(false)),
            b'1' => Ok(Some(true)),
            b'\n' | b'\r' => {
                self.ended = true;
                Ok(None)
            }
            other => {
                self.ended = true;
                Err(DecodeError::MalformedStream(format!(
                    "expected '0' or '1' at offset {offset}, got {:?}",
                    other as char
                )))
            }
        }
    }
}

/// Parse a textual bit-path, like `"0110"`.
pub fn parse_bit_path(path: &str) -> Result<BitVec, DecodeError> {
    if path.is_empty() {
        return Err(DecodeError::MalformedPath("empty bit-path".into()));
    }

    path.chars()
        .map(|c| match c {
            '0' => Ok(false),
            '1' => Ok(true),
            other => Err(DecodeError::MalformedPath(format!(
                "expected '0' or '1' in {path:?}, got {other:?}"
            ))),
        })
        .collect()
}
