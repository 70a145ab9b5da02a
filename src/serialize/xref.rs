//! Cross-reference table entries.

use crate::error::{Error, Result};

/// Width of one cross-reference line, terminator included.
pub const ENTRY_LEN: usize = 20;

/// Generation number of the free list head.
pub const FREE_HEAD_GENERATION: u16 = 65535;

/// One row of the cross-reference table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrossReferenceEntry {
    /// Byte offset of the object header (or next free object for free entries)
    pub byte_offset: usize,

    /// Generation number
    pub generation: u16,

    /// `n` when true, `f` otherwise
    pub in_use: bool,
}

impl CrossReferenceEntry {
    /// The sentinel free entry for object 0.
    pub fn free_head() -> Self {
        Self {
            byte_offset: 0,
            generation: FREE_HEAD_GENERATION,
            in_use: false,
        }
    }

    /// An in-use entry at the given offset.
    pub fn in_use(byte_offset: usize, generation: u16) -> Self {
        Self {
            byte_offset,
            generation,
            in_use: true,
        }
    }

    /// Render the fixed-width line: 10-digit offset, 5-digit generation,
    /// flag, then a space and newline.
    pub fn to_line(&self) -> Result<String> {
        let flag = if self.in_use { 'n' } else { 'f' };
        let line = format!("{:010} {:05} {} \n", self.byte_offset, self.generation, flag);
        if line.len() != ENTRY_LEN {
            return Err(Error::EncodingInvariant(format!(
                "cross-reference entry for offset {} is {} bytes, expected {}",
                self.byte_offset,
                line.len(),
                ENTRY_LEN
            )));
        }
        Ok(line)
    }

    /// Parse one fixed-width line (terminator optional).
    pub fn parse_line(line: &[u8]) -> Option<Self> {
        if line.get(10) != Some(&b' ') || line.get(16) != Some(&b' ') {
            return None;
        }

        Some(Self {
            byte_offset: parse_digits(line.get(..10)?)?,
            generation: parse_digits(line.get(11..16)?)?,
            in_use: match line.get(17)? {
                b'n' => true,
                b'f' => false,
                _ => return None,
            },
        })
    }
}

fn parse_digits<T: std::str::FromStr>(field: &[u8]) -> Option<T> {
    if !field.iter().all(u8::is_ascii_digit) {
        return None;
    }
    std::str::from_utf8(field).ok()?.parse().ok()
}
