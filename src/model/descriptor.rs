//! # Register Descriptors
//!
//! Static description of the registers of one SunSpec model family: where each
//! field sits relative to the start of its block, how it is encoded on the wire,
//! and what kind of field it is. Each family declares its registers with the
//! `register_map!` macro, which produces a plain enum implementing
//! [`RegisterMap`].
//!
//! ## Usage
//!
//! ```rust
//! use sunspec_rs::model::descriptor::{RawValue, WireType};
//!
//! assert_eq!(WireType::Int16.decode(&[0xFF9C]), Some(RawValue::Int16(-100)));
//! assert_eq!(WireType::Int16.decode(&[0x8000]), None);
//! assert_eq!(WireType::UInt32.decode(&[0x0001, 0x0000]), Some(RawValue::UInt32(65536)));
//! ```

use std::fmt;

use serde::Serialize;

use crate::constants::{
    SUNSPEC_NAN_INT16, SUNSPEC_NAN_INT32, SUNSPEC_NAN_UINT16, SUNSPEC_NAN_UINT32,
};

/// Encoding of a register value on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum WireType {
    UInt16,
    Int16,
    UInt32,
    Int32,
    Float32,
    /// ASCII text packed two characters per word.
    String(u16),
}

impl WireType {
    /// Number of 16-bit words the type occupies.
    pub const fn word_length(self) -> u16 {
        match self {
            WireType::UInt16 | WireType::Int16 => 1,
            WireType::UInt32 | WireType::Int32 | WireType::Float32 => 2,
            WireType::String(words) => words,
        }
    }

    /// Decodes a numeric value from `words`, high word first.
    ///
    /// Returns `None` when the words hold the type's "not implemented" sentinel,
    /// when fewer words than required are given, or for string types (see
    /// [`decode_string`]).
    pub fn decode(self, words: &[u16]) -> Option<RawValue> {
        match (self, words) {
            (WireType::UInt16, [w, ..]) => {
                (*w != SUNSPEC_NAN_UINT16).then_some(RawValue::UInt16(*w))
            }
            (WireType::Int16, [w, ..]) => {
                let v = *w as i16;
                (v != SUNSPEC_NAN_INT16).then_some(RawValue::Int16(v))
            }
            (WireType::UInt32, [hi, lo, ..]) => {
                let v = join_words(*hi, *lo);
                (v != SUNSPEC_NAN_UINT32).then_some(RawValue::UInt32(v))
            }
            (WireType::Int32, [hi, lo, ..]) => {
                let v = join_words(*hi, *lo) as i32;
                (v != SUNSPEC_NAN_INT32).then_some(RawValue::Int32(v))
            }
            (WireType::Float32, [hi, lo, ..]) => {
                let v = f32::from_bits(join_words(*hi, *lo));
                (!v.is_nan()).then_some(RawValue::Float32(v))
            }
            _ => None,
        }
    }
}

impl fmt::Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireType::UInt16 => write!(f, "uint16"),
            WireType::Int16 => write!(f, "int16"),
            WireType::UInt32 => write!(f, "uint32"),
            WireType::Int32 => write!(f, "int32"),
            WireType::Float32 => write!(f, "float32"),
            WireType::String(words) => write!(f, "string({words})"),
        }
    }
}

fn join_words(hi: u16, lo: u16) -> u32 {
    (u32::from(hi) << 16) | u32::from(lo)
}

/// Decodes ASCII text packed two characters per word, high byte first.
///
/// Trailing NUL and space padding is removed. Bytes outside the ASCII range are
/// replaced with `?`.
pub fn decode_string(words: &[u16]) -> String {
    let text: String = words
        .iter()
        .flat_map(|w| w.to_be_bytes())
        .map(|b| if b.is_ascii() { b as char } else { '?' })
        .collect();
    text.trim_end_matches(&['\0', ' '][..]).to_string()
}

/// A successfully decoded, non-sentinel register value.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub enum RawValue {
    UInt16(u16),
    Int16(i16),
    UInt32(u32),
    Int32(i32),
    Float32(f32),
}

impl RawValue {
    /// Returns the value widened to `f64`.
    pub fn as_f64(self) -> f64 {
        match self {
            RawValue::UInt16(v) => f64::from(v),
            RawValue::Int16(v) => f64::from(v),
            RawValue::UInt32(v) => f64::from(v),
            RawValue::Int32(v) => f64::from(v),
            RawValue::Float32(v) => f64::from(v),
        }
    }
}

/// What a register holds, beyond its wire encoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Classification {
    /// Signed power-of-ten exponent applied to other registers.
    ScaleFactor,
    /// Monotonically increasing counter.
    Accumulator,
    /// Set of independent flag bits.
    Bitfield,
    /// Code drawn from a fixed list of values.
    Enumeration,
}

/// One field of a model block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct RegisterDescriptor {
    pub name: &'static str,
    /// Offset relative to the base address of the owning block.
    pub offset: u16,
    pub wire_type: WireType,
    pub word_length: u16,
    pub classification: Option<Classification>,
}

impl RegisterDescriptor {
    pub const fn new(name: &'static str, offset: u16, wire_type: WireType) -> Self {
        Self {
            name,
            offset,
            wire_type,
            word_length: wire_type.word_length(),
            classification: None,
        }
    }

    pub const fn with_classification(mut self, classification: Classification) -> Self {
        self.classification = Some(classification);
        self
    }

    pub const fn with_word_length(mut self, word_length: u16) -> Self {
        self.word_length = word_length;
        self
    }

    /// Absolute address of this field for a block starting at `base`, or `None`
    /// past the end of the address space.
    pub fn address(&self, base: u32) -> Option<u32> {
        base.checked_add(u32::from(self.offset))
    }

    pub fn is_scale_factor(&self) -> bool {
        self.classification == Some(Classification::ScaleFactor)
    }
}

/// A static enumeration of the registers of one model family.
pub trait RegisterMap: Copy + fmt::Debug + 'static {
    fn descriptor(self) -> RegisterDescriptor;

    /// Every register of the family, in declaration order.
    fn all() -> &'static [Self];
}

/// Declares a register enumeration and its [`RegisterMap`] implementation.
///
/// Each entry is `Name => (offset, wire_type[, classification])`, where the wire
/// type is a [`WireType`] variant name and the classification a
/// [`Classification`] variant name.
macro_rules! register_map {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$vmeta:meta])*
                $variant:ident =>
                    ($offset:literal, $wire:ident $(($len:literal))? $(, $class:ident)?)
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        $vis enum $name {
            $( $(#[$vmeta])* $variant, )*
        }

        impl $crate::model::descriptor::RegisterMap for $name {
            fn descriptor(self) -> $crate::model::descriptor::RegisterDescriptor {
                match self {
                    $(
                        $name::$variant => $crate::model::descriptor::RegisterDescriptor::new(
                            stringify!($variant),
                            $offset,
                            $crate::model::descriptor::WireType::$wire $(($len))?,
                        )
                        $(.with_classification($crate::model::descriptor::Classification::$class))?,
                    )*
                }
            }

            fn all() -> &'static [Self] {
                &[ $( $name::$variant, )* ]
            }
        }
    };
}

pub(crate) use register_map;

/// Asserts that the registers of `R` sit back to back over `block_length` words
/// and that exactly the `*ScaleFactor` registers are int16 scale factors.
#[cfg(test)]
pub(crate) fn assert_register_table<R: RegisterMap>(block_length: u16) {
    let mut next = 0u16;
    for reg in R::all() {
        let d = reg.descriptor();
        assert_eq!(d.offset, next, "{reg:?}");
        assert_eq!(d.name.ends_with("ScaleFactor"), d.is_scale_factor(), "{reg:?}");
        if d.is_scale_factor() {
            assert_eq!(d.wire_type, WireType::Int16, "{reg:?}");
        }
        next += d.word_length;
    }
    assert_eq!(next, block_length);
}
