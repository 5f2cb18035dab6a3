//! Bob Jenkins' lookup3 mixing as a `Hasher`.
//!
//! The function reads the key as little-endian 32-bit words in 12-byte
//! blocks and finishes with the `final` avalanche. The internal state is
//! seeded with `0xdeadbeef + (len << 2) + initval`, the `hashword` style
//! seeding, so results differ from `hashlittle` for non-empty keys.
//!
//! It is fast and well-distributed but not cryptographic; do not expose
//! tables keyed by attacker-chosen strings without a seeded `BuildHasher` of
//! your own.

use core::hash::{BuildHasher, Hasher};

#[inline(always)]
fn word(b: &[u8]) -> u32 {
    u32::from_le_bytes([b[0], b[1], b[2], b[3]])
}

#[inline(always)]
fn mix(mut a: u32, mut b: u32, mut c: u32) -> (u32, u32, u32) {
    a = a.wrapping_sub(c);
    a ^= c.rotate_left(4);
    c = c.wrapping_add(b);
    b = b.wrapping_sub(a);
    b ^= a.rotate_left(6);
    a = a.wrapping_add(c);
    c = c.wrapping_sub(b);
    c ^= b.rotate_left(8);
    b = b.wrapping_add(a);
    a = a.wrapping_sub(c);
    a ^= c.rotate_left(16);
    c = c.wrapping_add(b);
    b = b.wrapping_sub(a);
    b ^= a.rotate_left(19);
    a = a.wrapping_add(c);
    c = c.wrapping_sub(b);
    c ^= b.rotate_left(4);
    b = b.wrapping_add(a);
    (a, b, c)
}

#[inline(always)]
fn final_mix(mut a: u32, mut b: u32, mut c: u32) -> u32 {
    c ^= b;
    c = c.wrapping_sub(b.rotate_left(14));
    a ^= c;
    a = a.wrapping_sub(c.rotate_left(11));
    b ^= a;
    b = b.wrapping_sub(a.rotate_left(25));
    c ^= b;
    c = c.wrapping_sub(b.rotate_left(16));
    a ^= c;
    a = a.wrapping_sub(c.rotate_left(4));
    b ^= a;
    b = b.wrapping_sub(a.rotate_left(14));
    c ^= b;
    c = c.wrapping_sub(b.rotate_left(24));
    c
}

/// Hash `key` with lookup3, starting from `initval`.
///
/// Passing a previous result as `initval` chains hashes over several
/// buffers.
pub fn lookup3(key: &[u8], initval: u32) -> u32 {
    let init = 0xdead_beef_u32
        .wrapping_add((key.len() as u32) << 2)
        .wrapping_add(initval);
    let (mut a, mut b, mut c) = (init, init, init);

    let mut k = key;
    while k.len() > 12 {
        a = a.wrapping_add(word(&k[0..4]));
        b = b.wrapping_add(word(&k[4..8]));
        c = c.wrapping_add(word(&k[8..12]));
        (a, b, c) = mix(a, b, c);
        k = &k[12..];
    }

    if k.is_empty() {
        return c;
    }

    // The last 1..=12 bytes, zero padded, as three little-endian words.
    let mut tail = [0u8; 12];
    tail[..k.len()].copy_from_slice(k);
    a = a.wrapping_add(word(&tail[0..4]));
    b = b.wrapping_add(word(&tail[4..8]));
    c = c.wrapping_add(word(&tail[8..12]));
    final_mix(a, b, c)
}

/// Streaming front-end: every `write` rehashes its bytes seeded with the
/// state left by the previous one.
#[derive(Clone, Debug)]
pub struct Lookup3Hasher {
    state: u32,
}

impl Lookup3Hasher {
    pub fn with_seed(seed: u32) -> Self {
        Self { state: seed }
    }
}

impl Hasher for Lookup3Hasher {
    #[inline]
    fn write(&mut self, bytes: &[u8]) {
        self.state = lookup3(bytes, self.state);
    }

    #[inline]
    fn finish(&self) -> u64 {
        self.state as u64
    }
}

/// Deterministic `BuildHasher` producing `Lookup3Hasher`s with a fixed seed.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Lookup3State {
    seed: u32,
}

impl Lookup3State {
    pub const DEFAULT_SEED: u32 = 12345;

    pub const fn with_seed(seed: u32) -> Self {
        Self { seed }
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }
}

impl Default for Lookup3State {
    fn default() -> Self {
        Self::with_seed(Self::DEFAULT_SEED)
    }
}

impl BuildHasher for Lookup3State {
    type Hasher = Lookup3Hasher;

    fn build_hasher(&self) -> Self::Hasher {
        Lookup3Hasher::with_seed(self.seed)
    }
}
