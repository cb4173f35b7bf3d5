//! Fixed-size little-endian records.

/// Plain data with a fixed byte layout.
///
/// `encode` fills exactly `SIZE` bytes and `decode` reads exactly `SIZE`
/// bytes. Callers hand in slices of that length.
pub trait Record: Sized {
    /// Encoded size in bytes.
    const SIZE: usize;

    /// Write `self` into `out`.
    fn encode(&self, out: &mut [u8]);

    /// Read a value back from `bytes`.
    fn decode(bytes: &[u8]) -> Self;
}

macro_rules! impl_record_le {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Record for $ty {
                const SIZE: usize = core::mem::size_of::<$ty>();

                fn encode(&self, out: &mut [u8]) {
                    out[..Self::SIZE].copy_from_slice(&self.to_le_bytes());
                }

                fn decode(bytes: &[u8]) -> Self {
                    let mut raw = [0u8; core::mem::size_of::<$ty>()];
                    raw.copy_from_slice(&bytes[..Self::SIZE]);
                    <$ty>::from_le_bytes(raw)
                }
            }
        )*
    };
}

impl_record_le!(u8, i8, u16, i16, u32, i32, f32);

impl Record for bool {
    const SIZE: usize = 1;

    fn encode(&self, out: &mut [u8]) {
        out[0] = u8::from(*self);
    }

    fn decode(bytes: &[u8]) -> Self {
        bytes[0] != 0
    }
}
