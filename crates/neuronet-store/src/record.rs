// Copyright 2025 NeuroNet Developers
// SPDX-License-Identifier: Apache-2.0

//! Record kinds and their fixed-width little-endian encodings

use byteorder::{ByteOrder, LittleEndian};
use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Numeric kind tag of a store. Selects the record width (1, 2, 4 or 8 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordKind {
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    F32,
    U64,
    I64,
    F64,
}

impl RecordKind {
    /// Width of one record in bytes
    pub const fn width(self) -> usize {
        match self {
            RecordKind::U8 | RecordKind::I8 => 1,
            RecordKind::U16 | RecordKind::I16 => 2,
            RecordKind::U32 | RecordKind::I32 | RecordKind::F32 => 4,
            RecordKind::U64 | RecordKind::I64 | RecordKind::F64 => 8,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            RecordKind::U8 => "u8",
            RecordKind::I8 => "i8",
            RecordKind::U16 => "u16",
            RecordKind::I16 => "i16",
            RecordKind::U32 => "u32",
            RecordKind::I32 => "i32",
            RecordKind::F32 => "f32",
            RecordKind::U64 => "u64",
            RecordKind::I64 => "i64",
            RecordKind::F64 => "f64",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordKind {
    type Err = StoreError;

    /// Accepts Rust type names plus the C names used by older recordings
    /// (`float`, `double`, `signed_short`, ...).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s.trim().to_ascii_lowercase().as_str() {
            "u8" | "unsigned_char" => RecordKind::U8,
            "i8" | "signed_char" | "char" => RecordKind::I8,
            "u16" | "unsigned_short" => RecordKind::U16,
            "i16" | "signed_short" => RecordKind::I16,
            "u32" | "unsigned_int" | "unsigned_long" => RecordKind::U32,
            "i32" | "signed_int" | "signed_long" => RecordKind::I32,
            "f32" | "float" => RecordKind::F32,
            "u64" => RecordKind::U64,
            "i64" => RecordKind::I64,
            "f64" | "double" => RecordKind::F64,
            other => return Err(StoreError::UnknownKind(other.to_string())),
        };
        Ok(kind)
    }
}

/// A value that can be stored as one fixed-width record.
pub trait Record: Copy + PartialEq + fmt::Debug + Send + Sync + 'static {
    const KIND: RecordKind;

    /// Encode into exactly `KIND.width()` bytes
    fn encode(self, buf: &mut [u8]);

    /// Decode from exactly `KIND.width()` bytes
    fn decode(buf: &[u8]) -> Self;
}

impl Record for u8 {
    const KIND: RecordKind = RecordKind::U8;

    #[inline]
    fn encode(self, buf: &mut [u8]) {
        buf[0] = self;
    }

    #[inline]
    fn decode(buf: &[u8]) -> Self {
        buf[0]
    }
}

impl Record for i8 {
    const KIND: RecordKind = RecordKind::I8;

    #[inline]
    fn encode(self, buf: &mut [u8]) {
        buf[0] = self as u8;
    }

    #[inline]
    fn decode(buf: &[u8]) -> Self {
        buf[0] as i8
    }
}

macro_rules! impl_record {
    ($ty:ty, $kind:ident, $write:ident, $read:ident) => {
        impl Record for $ty {
            const KIND: RecordKind = RecordKind::$kind;

            #[inline]
            fn encode(self, buf: &mut [u8]) {
                LittleEndian::$write(buf, self);
            }

            #[inline]
            fn decode(buf: &[u8]) -> Self {
                LittleEndian::$read(buf)
            }
        }
    };
}

impl_record!(u16, U16, write_u16, read_u16);
impl_record!(i16, I16, write_i16, read_i16);
impl_record!(u32, U32, write_u32, read_u32);
impl_record!(i32, I32, write_i32, read_i32);
impl_record!(f32, F32, write_f32, read_f32);
impl_record!(u64, U64, write_u64, read_u64);
impl_record!(i64, I64, write_i64, read_i64);
impl_record!(f64, F64, write_f64, read_f64);

/// Records supporting the elementwise store operations.
///
/// Every operation is checked: `None` means the result does not fit the
/// record kind (integer overflow or division by zero). Floats follow IEEE
/// semantics and always produce a value.
pub trait Numeric: Record {
    fn checked_add(self, rhs: Self) -> Option<Self>;
    fn checked_sub(self, rhs: Self) -> Option<Self>;
    fn checked_mul(self, rhs: Self) -> Option<Self>;
    fn checked_div(self, rhs: Self) -> Option<Self>;
}

macro_rules! impl_numeric_int {
    ($($ty:ty),*) => {
        $(
            impl Numeric for $ty {
                #[inline]
                fn checked_add(self, rhs: Self) -> Option<Self> {
                    <$ty>::checked_add(self, rhs)
                }

                #[inline]
                fn checked_sub(self, rhs: Self) -> Option<Self> {
                    <$ty>::checked_sub(self, rhs)
                }

                #[inline]
                fn checked_mul(self, rhs: Self) -> Option<Self> {
                    <$ty>::checked_mul(self, rhs)
                }

                #[inline]
                fn checked_div(self, rhs: Self) -> Option<Self> {
                    <$ty>::checked_div(self, rhs)
                }
            }
        )*
    };
}

macro_rules! impl_numeric_float {
    ($($ty:ty),*) => {
        $(
            impl Numeric for $ty {
                #[inline]
                fn checked_add(self, rhs: Self) -> Option<Self> {
                    Some(self + rhs)
                }

                #[inline]
                fn checked_sub(self, rhs: Self) -> Option<Self> {
                    Some(self - rhs)
                }

                #[inline]
                fn checked_mul(self, rhs: Self) -> Option<Self> {
                    Some(self * rhs)
                }

                #[inline]
                fn checked_div(self, rhs: Self) -> Option<Self> {
                    Some(self / rhs)
                }
            }
        )*
    };
}

impl_numeric_int!(u8, i8, u16, i16, u32, i32, u64, i64);
impl_numeric_float!(f32, f64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widths() {
        assert_eq!(RecordKind::U8.width(), 1);
        assert_eq!(RecordKind::I16.width(), 2);
        assert_eq!(RecordKind::F32.width(), 4);
        assert_eq!(RecordKind::F64.width(), 8);
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!("double".parse::<RecordKind>().unwrap(), RecordKind::F64);
        assert_eq!("F32".parse::<RecordKind>().unwrap(), RecordKind::F32);
        assert_eq!("signed_short".parse::<RecordKind>().unwrap(), RecordKind::I16);
        assert!("complex".parse::<RecordKind>().is_err());
    }

    #[test]
    fn test_encoding_is_little_endian() {
        let mut buf = [0u8; 4];
        0x0102_0304u32.encode(&mut buf);
        assert_eq!(buf, [0x04, 0x03, 0x02, 0x01]);
        assert_eq!(u32::decode(&buf), 0x0102_0304);

        let mut buf = [0u8; 1];
        (-3i8).encode(&mut buf);
        assert_eq!(i8::decode(&buf), -3);
    }

    #[test]
    fn test_checked_arithmetic() {
        assert_eq!(Numeric::checked_add(200u8, 100), None);
        assert_eq!(Numeric::checked_sub(0u16, 1), None);
        assert_eq!(Numeric::checked_mul(i8::MAX, 2), None);
        assert_eq!(Numeric::checked_div(4i32, 0), None);
        assert_eq!(Numeric::checked_div(i64::MIN, -1), None);
        assert_eq!(Numeric::checked_add(2u8, 3), Some(5));
        assert_eq!(Numeric::checked_div(1.0f64, 0.0), Some(f64::INFINITY));
    }
}
