//! Big-endian encoding of scalars

/// A value stored in a font file as a fixed number of big-endian bytes.
pub trait Scalar: Sized {
    /// The raw byte representation of this type.
    type Raw: sealed::BeByteArray;

    fn from_raw(raw: Self::Raw) -> Self;

    fn to_raw(self) -> Self::Raw;

    /// Decode a scalar from a slice of exactly [`FixedSize::RAW_BYTE_LEN`]
    /// bytes; any other length returns `None`.
    fn read(slice: &[u8]) -> Option<Self> {
        sealed::BeByteArray::from_slice(slice).map(Self::from_raw)
    }
}

/// A trait for types that have a known, constant size.
pub trait FixedSize: Sized {
    /// The size of this type in a font file, in bytes.
    const RAW_BYTE_LEN: usize;
}

impl<T: Scalar> FixedSize for T {
    const RAW_BYTE_LEN: usize = <T::Raw as sealed::BeByteArray>::LEN;
}

pub(crate) mod sealed {
    /// Any fixed-size byte array; keeps `Scalar::Raw` closed to outside types.
    pub trait BeByteArray: Copy + AsRef<[u8]> {
        const LEN: usize;

        /// Succeeds exactly when `slice.len() == LEN`.
        fn from_slice(slice: &[u8]) -> Option<Self>;
    }

    impl<const N: usize> BeByteArray for [u8; N] {
        const LEN: usize = N;

        fn from_slice(slice: &[u8]) -> Option<Self> {
            slice.try_into().ok()
        }
    }
}

macro_rules! int_scalar {
    ($($ty:ty => $len:literal),* $(,)?) => {
        $(
            impl Scalar for $ty {
                type Raw = [u8; $len];

                fn to_raw(self) -> Self::Raw {
                    self.to_be_bytes()
                }

                #[inline(always)]
                fn from_raw(raw: Self::Raw) -> $ty {
                    Self::from_be_bytes(raw)
                }
            }
        )*
    };
}

int_scalar!(u8 => 1, u16 => 2, i16 => 2, u32 => 4, i32 => 4, i64 => 8, u64 => 8);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_exact_length_only() {
        assert_eq!(u16::read(&[0x12, 0x34]), Some(0x1234));
        assert_eq!(u16::read(&[0x12]), None);
        assert_eq!(u16::read(&[0x12, 0x34, 0x56]), None);
        assert_eq!(i64::read(&[0xFF; 8]), Some(-1));
    }

    #[test]
    fn raw_byte_len() {
        assert_eq!(u8::RAW_BYTE_LEN, 1);
        assert_eq!(u32::RAW_BYTE_LEN, 4);
        assert_eq!(i64::RAW_BYTE_LEN, 8);
    }

    #[test]
    fn encodes_big_endian() {
        assert_eq!(0xB1B0AFBAu32.to_raw(), [0xB1, 0xB0, 0xAF, 0xBA]);
        assert_eq!(i16::from_raw([0xFF, 0xFE]), -2);
    }
}
