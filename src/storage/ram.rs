//! In-memory byte store.

use crate::error::StorageError;

use super::ByteStore;

/// Value of an erased EEPROM cell.
pub const ERASED: u8 = 0xFF;

/// Byte store backed by an array, starting out erased.
///
/// Counts physical writes so wear can be checked.
#[derive(Debug, Clone)]
pub struct RamStore<const N: usize> {
    bytes: [u8; N],
    writes: usize,
}

impl<const N: usize> RamStore<N> {
    /// Create an erased store.
    pub const fn new() -> Self {
        Self {
            bytes: [ERASED; N],
            writes: 0,
        }
    }

    /// Raw contents.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Bytes written since creation.
    #[inline]
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl<const N: usize> Default for RamStore<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> ByteStore for RamStore<N> {
    fn capacity(&self) -> usize {
        N
    }

    fn read_byte(&mut self, address: usize) -> Result<u8, StorageError> {
        self.bytes.get(address).copied().ok_or(StorageError::OutOfBounds {
            address,
            len: 1,
            capacity: N,
        })
    }

    fn write_byte(&mut self, address: usize, value: u8) -> Result<(), StorageError> {
        let cell = self.bytes.get_mut(address).ok_or(StorageError::OutOfBounds {
            address,
            len: 1,
            capacity: N,
        })?;
        *cell = value;
        self.writes += 1;
        Ok(())
    }
}
