//! DDRAM row base addresses.

use crate::error::ConfigurationError;
use crate::{Error, Result};

/// Ordered DDRAM base address of each display row.
///
/// The index is the logical row number. Most 16x2 and 20x2 modules use
/// `[0x00, 0x40]`; four-row modules interleave the second controller line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineAddressTable {
    rows: Vec<u8>,
}

impl LineAddressTable {
    /// Creates a table from explicit base addresses.
    pub fn new(rows: Vec<u8>) -> std::result::Result<Self, ConfigurationError> {
        if rows.is_empty() {
            return Err(ConfigurationError::EmptyLineTable);
        }
        Ok(Self { rows })
    }

    /// 16x2 / 20x2 / 40x2 modules.
    pub fn two_line() -> Self {
        Self {
            rows: vec![0x00, 0x40],
        }
    }

    /// 16x4 modules.
    pub fn four_line_16() -> Self {
        Self {
            rows: vec![0x00, 0x40, 0x10, 0x50],
        }
    }

    /// 20x4 modules.
    pub fn four_line_20() -> Self {
        Self {
            rows: vec![0x00, 0x40, 0x14, 0x54],
        }
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows.len()
    }

    /// Base address of `row`.
    pub fn address(&self, row: usize) -> Result<u8> {
        self.rows.get(row).copied().ok_or(Error::Index {
            row,
            rows: self.rows.len(),
        })
    }

    /// All base addresses in row order.
    pub fn as_slice(&self) -> &[u8] {
        &self.rows
    }
}

impl Default for LineAddressTable {
    fn default() -> Self {
        Self::two_line()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table() {
        let table = LineAddressTable::default();
        assert_eq!(table.as_slice(), &[0x00, 0x40]);
        assert_eq!(table.rows(), 2);
    }

    #[test]
    fn test_empty_table_rejected() {
        assert_eq!(
            LineAddressTable::new(Vec::new()),
            Err(ConfigurationError::EmptyLineTable)
        );
    }

    #[test]
    fn test_address_lookup() {
        let table = LineAddressTable::four_line_20();
        assert_eq!(table.address(2).unwrap(), 0x14);
        assert_eq!(table.address(3).unwrap(), 0x54);
        assert!(matches!(
            table.address(4),
            Err(Error::Index { row: 4, rows: 4 })
        ));
    }
}
