//! Persistent settings storage.
//!
//! Typed values are kept in a byte-addressed non-volatile memory (EEPROM
//! shaped) using a fixed little-endian layout.

mod ram;
mod record;
mod settings;

pub use ram::{RamStore, ERASED};
pub use record::Record;
pub use settings::{StoredSettings, SETTINGS_SIGNATURE};

use crate::error::{Result, StorageError};

/// Largest record [`TypedStore`] can move in one call.
pub const MAX_RECORD_SIZE: usize = 64;

/// Byte-addressed non-volatile memory.
pub trait ByteStore {
    /// Size in bytes.
    fn capacity(&self) -> usize;

    /// Read one byte.
    fn read_byte(&mut self, address: usize) -> core::result::Result<u8, StorageError>;

    /// Write one byte.
    fn write_byte(&mut self, address: usize, value: u8) -> core::result::Result<(), StorageError>;
}

impl<T: ByteStore + ?Sized> ByteStore for &mut T {
    fn capacity(&self) -> usize {
        (**self).capacity()
    }

    fn read_byte(&mut self, address: usize) -> core::result::Result<u8, StorageError> {
        (**self).read_byte(address)
    }

    fn write_byte(&mut self, address: usize, value: u8) -> core::result::Result<(), StorageError> {
        (**self).write_byte(address, value)
    }
}

/// Typed access to a [`ByteStore`].
pub struct TypedStore<S>
where
    S: ByteStore,
{
    store: S,
}

impl<S> TypedStore<S>
where
    S: ByteStore,
{
    /// Wrap a byte store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Encoded size of `T` in bytes.
    #[inline]
    pub const fn size_of<T: Record>() -> usize {
        T::SIZE
    }

    /// Borrow the underlying store.
    #[inline]
    pub fn inner(&self) -> &S {
        &self.store
    }

    /// Give back the underlying store.
    pub fn into_inner(self) -> S {
        self.store
    }

    /// Store `value` at `address`.
    ///
    /// Bytes that already hold the right value are not rewritten. Returns
    /// the number of bytes actually written.
    ///
    /// # Errors
    ///
    /// Returns `OutOfBounds` if the record does not fit, before touching
    /// the store.
    pub fn write<T: Record>(&mut self, address: usize, value: &T) -> Result<usize> {
        self.check_bounds::<T>(address)?;

        let mut scratch = [0u8; MAX_RECORD_SIZE];
        let encoded = &mut scratch[..T::SIZE];
        value.encode(encoded);

        let mut written = 0;
        for (offset, &byte) in encoded.iter().enumerate() {
            let cell = address + offset;
            if self.store.read_byte(cell)? != byte {
                self.store.write_byte(cell, byte)?;
                written += 1;
            }
        }

        trace!("stored {} bytes at {}, {} changed", T::SIZE, address, written);
        Ok(written)
    }

    /// Load a `T` from `address`.
    ///
    /// # Errors
    ///
    /// Returns `OutOfBounds` if the record does not fit.
    pub fn read<T: Record>(&mut self, address: usize) -> Result<T> {
        self.check_bounds::<T>(address)?;

        let mut scratch = [0u8; MAX_RECORD_SIZE];
        let encoded = &mut scratch[..T::SIZE];
        for (offset, byte) in encoded.iter_mut().enumerate() {
            *byte = self.store.read_byte(address + offset)?;
        }

        Ok(T::decode(encoded))
    }

    fn check_bounds<T: Record>(&self, address: usize) -> Result<()> {
        let capacity = self.store.capacity();
        let fits = T::SIZE <= MAX_RECORD_SIZE
            && address
                .checked_add(T::SIZE)
                .is_some_and(|end| end <= capacity);

        if fits {
            Ok(())
        } else {
            Err(StorageError::OutOfBounds {
                address,
                len: T::SIZE,
                capacity,
            }
            .into())
        }
    }
}
