use std::io::{self, prelude::*, Cursor};

use crate::{BitSource, DecodeError, Symbols};

/// A chunk of decoded UTF-8 text, or the error that ended decoding.
pub(crate) type Chunk = Result<Vec<u8>, DecodeError>;

/// Size of output chunks, in bytes (except possibly the last chunk, which may
/// be smaller).
const OUT_CHUNK_SIZE: usize = 32 * 1024;

/// Exposes decoded chunks as a byte stream. Decode errors surface as
/// `io::ErrorKind::InvalidData`.
///
/// Implements `BufRead`.
pub struct DecodedReader<I: Iterator<Item = Chunk>> {
    /// The (perhaps partially-consumed) current chunk.
    curr_chunk: Cursor<Vec<u8>>,

    /// The source of all future chunks.
    chunks: I,
}

impl<I: Iterator<Item = Chunk>> DecodedReader<I> {
    pub fn new(chunks: I) -> Self {
        Self {
            chunks,
            curr_chunk: Cursor::default(),
        }
    }
}

impl<I: Iterator<Item = Chunk>> BufRead for DecodedReader<I> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        if self.curr_chunk.fill_buf()?.is_empty() {
            // An exhausted decoder leaves an empty chunk behind, which reads as EOF.
            let next = self.chunks.next().transpose()?;
            self.curr_chunk = Cursor::new(next.unwrap_or_default());
        }

        self.curr_chunk.fill_buf()
    }

    fn consume(&mut self, amt: usize) {
        self.curr_chunk.consume(amt);
    }
}

impl<I: Iterator<Item = Chunk>> Read for DecodedReader<I> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.fill_buf()?.read(buf)?;
        self.consume(n);

        Ok(n)
    }
}

/// Groups decoded symbols into chunks of UTF-8 bytes.
///
/// Implements iterator, producing chunks of bytes.
pub(crate) struct SymbolChunks<'a, B> {
    symbols: Symbols<'a, B>,

    /// An error that cut the previous chunk short. Reported on the next call,
    /// so the symbols decoded before it aren't lost.
    pending: Option<DecodeError>,
}

impl<'a, B: BitSource> SymbolChunks<'a, B> {
    pub fn new(symbols: Symbols<'a, B>) -> Self {
        Self {
            symbols,
            pending: None,
        }
    }

    /// Return `Ok(None)` once the symbols run out.
    fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, DecodeError> {
        if let Some(e) = self.pending.take() {
            return Err(e);
        }

        let mut chunk = Vec::with_capacity(OUT_CHUNK_SIZE);
        let mut utf8 = [0; 4];
        while chunk.len() + utf8.len() <= OUT_CHUNK_SIZE {
            match self.symbols.next() {
                Some(Ok(symbol)) => {
                    chunk.extend_from_slice(symbol.encode_utf8(&mut utf8).as_bytes());
                }
                Some(Err(e)) if chunk.is_empty() => return Err(e),
                Some(Err(e)) => {
                    self.pending = Some(e);
                    break;
                }
                None => break,
            }
        }

        if chunk.is_empty() {
            Ok(None)
        } else {
            Ok(Some(chunk))
        }
    }
}

impl<'a, B: BitSource> Iterator for SymbolChunks<'a, B> {
    type Item = Chunk;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_chunk().transpose()
    }
}

#[cfg(test)]
mod tests {
    use std::io::{BufRead, Read};

    use super::*;
    use crate::{PrefixTree, TextBits};

    fn abc() -> PrefixTree {
        let mut tree = PrefixTree::new();
        for (symbol, path) in [('a', "0"), ('b', "10"), ('c', "11")] {
            tree.insert_str(symbol, path).unwrap();
        }
        tree
    }

    #[test]
    fn reads_decoded_symbols() -> anyhow::Result<()> {
        let tree = abc();
        let mut reader = DecodedReader::new(SymbolChunks::new(
            tree.decode(TextBits::new(&b"010011\n"[..])),
        ));

        let mut out = String::new();
        reader.read_to_string(&mut out)?;
        assert_eq!(out, "abac");

        Ok(())
    }

    #[test]
    fn output_spans_several_chunks() -> anyhow::Result<()> {
        let tree = abc();
        let bits = vec![true; 2 * 100_000];
        let chunks: Vec<Vec<u8>> =
            SymbolChunks::new(tree.decode(bits.into_iter())).collect::<Result<_, _>>()?;

        assert!(chunks.len() >= 2);
        assert!(chunks.iter().all(|chunk| chunk.len() <= OUT_CHUNK_SIZE));
        let decoded = chunks.concat();
        assert_eq!(decoded, vec![b'c'; 100_000]);

        Ok(())
    }

    #[test]
    fn output_before_an_error_is_kept() {
        let tree = abc();
        let mut chunks = SymbolChunks::new(tree.decode(TextBits::new(&b"0100x"[..])));

        assert_eq!(chunks.next().unwrap().unwrap(), b"aba");
        let err = chunks.next().unwrap().unwrap_err();
        assert!(matches!(err, DecodeError::MalformedStream(_)), "{err}");
        assert!(chunks.next().is_none());
    }

    #[test]
    fn reader_reports_decode_errors_as_invalid_data() {
        let mut tree = PrefixTree::new();
        tree.insert_str('a', "00").unwrap();
        let mut reader = DecodedReader::new(SymbolChunks::new(
            tree.decode(TextBits::new(&b"01"[..])),
        ));

        let err = reader.fill_buf().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert!(err.to_string().starts_with("malformed tree"), "{err}");
    }

    #[test]
    fn multibyte_symbols() -> anyhow::Result<()> {
        let mut tree = PrefixTree::new();
        tree.insert_str('\u{3bb}', "0")?;
        tree.insert_str('\u{1f980}', "1")?;

        let mut out = String::new();
        DecodedReader::new(SymbolChunks::new(tree.decode([true, false].into_iter())))
            .read_to_string(&mut out)?;
        assert_eq!(out, "\u{1f980}\u{3bb}");

        Ok(())
    }
}
