use std::{io::BufRead, str::FromStr};

use bitvec::vec::BitVec;

use crate::{bits::parse_bit_path, Checks, DecodeError, PrefixTree};

/// A code table, as read from text:
///
/// ```text
/// 3
/// a0
/// b10
/// c11
/// ```
///
/// The first line is the number of entries. Each entry is a symbol (one
/// character) immediately followed by its bit-path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeTable {
    entries: Vec<(char, BitVec)>,
}

impl CodeTable {
    /// Read the count line and that many entry lines, leaving the rest of
    /// `input` (usually the encoded message) unread.
    pub fn read(input: &mut impl BufRead) -> Result<Self, DecodeError> {
        let header = read_line(input)?.ok_or_else(|| table_error("missing entry count"))?;
        let count: usize = header
            .trim()
            .parse()
            .map_err(|_| table_error(format!("expected an entry count, got {header:?}")))?;

        // The count is untrusted; let the entries themselves grow the table.
        let mut entries = Vec::new();
        for i in 0..count {
            let line = read_line(input)?.ok_or_else(|| {
                table_error(format!("expected {count} entries, only found {i}"))
            })?;

            let mut chars = line.chars();
            let symbol = chars
                .next()
                .ok_or_else(|| table_error(format!("entry {} is empty", i + 1)))?;
            entries.push((symbol, parse_bit_path(chars.as_str())?));
        }

        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[(char, BitVec)] {
        &self.entries
    }

    /// Insert every entry, in order, into a new tree.
    pub fn build(&self, checks: Checks) -> Result<PrefixTree, DecodeError> {
        let mut tree = PrefixTree::with_checks(checks);
        for (symbol, path) in &self.entries {
            tree.insert(*symbol, path)?;
        }

        tracing::debug!(
            symbols = self.entries.len(),
            nodes = tree.node_count(),
            "built prefix tree"
        );
        Ok(tree)
    }
}

impl FromStr for CodeTable {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::read(&mut s.as_bytes())
    }
}

/// Read one line, without its line break. `None` at EOF.
fn read_line(input: &mut impl BufRead) -> Result<Option<String>, DecodeError> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }

    let trimmed_len = line.trim_end_matches(|c: char| c == '\n' || c == '\r').len();
    line.truncate(trimmed_len);
    Ok(Some(line))
}

fn table_error(msg: impl Into<String>) -> DecodeError {
    DecodeError::Table(msg.into())
}
