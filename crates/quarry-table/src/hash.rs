//! Key hashing.
//!
//! A table hashes keys through the [`KeyHasher`] capability. Any
//! `Fn(&K) -> u64` closure is one, so stateless custom hashes need no
//! wrapper type. The default, [`Fnv1a`], runs FNV-1a over the raw bytes of
//! a key as exposed by [`RawKey`]; [`StdHash`] bridges to anything that
//! implements [`std::hash::Hash`].

use std::hash::{BuildHasher, Hash, RandomState};

/// Maps keys to 64-bit hashes.
///
/// Must be deterministic for the lifetime of a table, and equal keys must
/// hash equally.
pub trait KeyHasher<K: ?Sized> {
    /// Hash `key`.
    fn hash_key(&self, key: &K) -> u64;
}

impl<K: ?Sized, F> KeyHasher<K> for F
where
    F: Fn(&K) -> u64,
{
    #[inline]
    fn hash_key(&self, key: &K) -> u64 {
        self(key)
    }
}

/// Streaming FNV-1a state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Fnv1aState(u64);

impl Fnv1aState {
    /// FNV-1a 64-bit offset basis.
    pub const OFFSET_BASIS: u64 = 0xCBF2_9CE4_8422_2325;
    /// FNV-1a 64-bit prime.
    pub const PRIME: u64 = 0x0000_0100_0000_01B3;

    /// Fresh state at the offset basis.
    pub const fn new() -> Self {
        Self(Self::OFFSET_BASIS)
    }

    /// Mix `bytes` into the state.
    #[inline]
    pub fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 ^= u64::from(b);
            self.0 = self.0.wrapping_mul(Self::PRIME);
        }
    }

    /// The hash of everything written so far.
    #[inline]
    pub const fn finish(self) -> u64 {
        self.0
    }
}

impl Default for Fnv1aState {
    fn default() -> Self {
        Self::new()
    }
}

/// FNV-1a over a byte slice.
#[inline]
pub fn fnv1a(bytes: &[u8]) -> u64 {
    let mut state = Fnv1aState::new();
    state.write(bytes);
    state.finish()
}

/// Keys whose hash input is their raw content.
///
/// Byte sequences contribute their bytes; integers, `char` and `bool`
/// contribute their native-endian representation; sequences of those
/// contribute each element in order. Types with padding or pointers have
/// no meaningful raw representation and are deliberately left out: give
/// the table a custom [`KeyHasher`] for them.
pub trait RawKey {
    /// Feed this key's raw bytes into `state`.
    fn write_raw(&self, state: &mut Fnv1aState);
}

macro_rules! impl_raw_key_for_int {
    ($($t:ty),* $(,)?) => {
        $(
            impl RawKey for $t {
                #[inline]
                fn write_raw(&self, state: &mut Fnv1aState) {
                    state.write(&self.to_ne_bytes());
                }
            }
        )*
    };
}

impl_raw_key_for_int!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize);

impl RawKey for bool {
    #[inline]
    fn write_raw(&self, state: &mut Fnv1aState) {
        state.write(&[u8::from(*self)]);
    }
}

impl RawKey for char {
    #[inline]
    fn write_raw(&self, state: &mut Fnv1aState) {
        state.write(&u32::from(*self).to_ne_bytes());
    }
}

impl RawKey for str {
    #[inline]
    fn write_raw(&self, state: &mut Fnv1aState) {
        state.write(self.as_bytes());
    }
}

impl RawKey for String {
    #[inline]
    fn write_raw(&self, state: &mut Fnv1aState) {
        state.write(self.as_bytes());
    }
}

impl<T: RawKey> RawKey for [T] {
    #[inline]
    fn write_raw(&self, state: &mut Fnv1aState) {
        for item in self {
            item.write_raw(state);
        }
    }
}

impl<T: RawKey, const N: usize> RawKey for [T; N] {
    #[inline]
    fn write_raw(&self, state: &mut Fnv1aState) {
        self.as_slice().write_raw(state);
    }
}

impl<T: RawKey> RawKey for Vec<T> {
    #[inline]
    fn write_raw(&self, state: &mut Fnv1aState) {
        self.as_slice().write_raw(state);
    }
}

impl<T: RawKey + ?Sized> RawKey for Box<T> {
    #[inline]
    fn write_raw(&self, state: &mut Fnv1aState) {
        (**self).write_raw(state);
    }
}

impl<T: RawKey + ?Sized> RawKey for &T {
    #[inline]
    fn write_raw(&self, state: &mut Fnv1aState) {
        (**self).write_raw(state);
    }
}

/// The default hasher: FNV-1a over a key's [`RawKey`] bytes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Fnv1a;

impl<K: RawKey + ?Sized> KeyHasher<K> for Fnv1a {
    #[inline]
    fn hash_key(&self, key: &K) -> u64 {
        let mut state = Fnv1aState::new();
        key.write_raw(&mut state);
        state.finish()
    }
}

/// Hashes keys through [`std::hash::Hash`] with any [`BuildHasher`].
///
/// Useful for composite keys that have no raw representation, such as
/// tuples or structs with padding.
#[derive(Clone, Debug, Default)]
pub struct StdHash<S = RandomState>(pub S);

impl<K: Hash + ?Sized, S: BuildHasher> KeyHasher<K> for StdHash<S> {
    #[inline]
    fn hash_key(&self, key: &K) -> u64 {
        self.0.hash_one(key)
    }
}
