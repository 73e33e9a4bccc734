use std::ops::{Index, IndexMut};

/// A 4-bit unsigned integer.
///
/// Register selectors and opcode sub-fields are nibbles; carrying them as a
/// dedicated type lets the 16-entry register file and keypad be indexed
/// without a bounds check at every use site.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[allow(non_camel_case_types)]
pub struct u4(u8);

impl u4 {
    /// Creates a new `u4`.
    ///
    /// Panics if the value does not fit in 4 bits.
    pub const fn new(value: u8) -> Self {
        assert!(value <= 0x0F, "u4 value must fit in 4 bits");
        Self(value)
    }

    /// Creates a `u4` from the low 4 bits of `value`, discarding the rest.
    pub const fn from_low(value: u8) -> Self {
        Self(value & 0x0F)
    }
}

impl From<u4> for u8 {
    fn from(v: u4) -> u8 {
        v.0
    }
}

impl From<u4> for u16 {
    fn from(v: u4) -> u16 {
        v.0.into()
    }
}

impl From<u4> for usize {
    fn from(v: u4) -> usize {
        v.0.into()
    }
}

impl<T> Index<u4> for [T; 16] {
    type Output = T;

    fn index(&self, index: u4) -> &Self::Output {
        &self[index.0 as usize]
    }
}

impl<T> IndexMut<u4> for [T; 16] {
    fn index_mut(&mut self, index: u4) -> &mut Self::Output {
        &mut self[index.0 as usize]
    }
}
