//! Local-name minting for new graph nodes.
//!
//! Every node the compiler creates gets a slug-shaped local name: four groups
//! of five lowercase letters joined by `-` (`abcde-fghij-klmno-pqrst`).
//!
//! Two sources:
//!
//! - [`StructuralSlugs`] (default): the letters are derived from an FNV-1a 64-bit
//!   digest of the node's structural path (platform, stream, field path, role).
//!   The same catalog always yields the same IRIs, so output diffs cleanly.
//! - [`RandomSlugs`]: letters drawn from an RNG. No uniqueness check; with 26^20
//!   possible names collisions are not a practical concern.
//!
//! Like the digest itself, this is **not** a security primitive.

use rand::Rng;

const SEGMENTS: usize = 4;
const SEGMENT_LEN: usize = 5;

const FNV_OFFSET_BASIS: u64 = 0xcbf29ce484222325;
const FNV_PRIME: u64 = 0x00000100000001b3;

fn fnv_add(hash: &mut u64, bytes: &[u8]) {
    for b in bytes {
        *hash ^= (*b) as u64;
        *hash = hash.wrapping_mul(FNV_PRIME);
    }
}

pub trait SlugMinter {
    /// Mint a local name for the node identified by `path`.
    fn mint(&mut self, path: &[&str]) -> String;
}

/// Lay out `SEGMENTS` groups of `SEGMENT_LEN` letters, one per `next()` call.
fn slug_from(mut next: impl FnMut() -> u8) -> String {
    let mut out = String::with_capacity(SEGMENTS * (SEGMENT_LEN + 1));
    for s in 0..SEGMENTS {
        if s > 0 {
            out.push('-');
        }
        for _ in 0..SEGMENT_LEN {
            out.push((b'a' + next()) as char);
        }
    }
    out
}

#[derive(Debug, Clone)]
pub struct StructuralSlugs {
    seed: String,
}

impl StructuralSlugs {
    /// `seed` scopes the names (the platform name); two platforms compiled from
    /// the same catalog get disjoint names.
    pub fn new(seed: impl Into<String>) -> Self {
        Self { seed: seed.into() }
    }

    fn digest(&self, path: &[&str], salt: &str) -> u64 {
        let mut hash = FNV_OFFSET_BASIS;
        fnv_add(&mut hash, b"seed=");
        fnv_add(&mut hash, self.seed.as_bytes());
        fnv_add(&mut hash, b"|path=");
        for segment in path {
            fnv_add(&mut hash, segment.as_bytes());
            // Unit separator: `["ab", "c"]` and `["a", "bc"]` must differ.
            fnv_add(&mut hash, &[0x1f]);
        }
        fnv_add(&mut hash, b"|salt=");
        fnv_add(&mut hash, salt.as_bytes());
        hash
    }
}

impl SlugMinter for StructuralSlugs {
    fn mint(&mut self, path: &[&str]) -> String {
        let hi = self.digest(path, "hi") as u128;
        let lo = self.digest(path, "lo") as u128;
        let mut n = (hi << 64) | lo;
        slug_from(|| {
            let letter = (n % 26) as u8;
            n /= 26;
            letter
        })
    }
}

pub struct RandomSlugs<R: Rng> {
    rng: R,
}

impl RandomSlugs<rand::rngs::ThreadRng> {
    pub fn new() -> Self {
        Self::with_rng(rand::thread_rng())
    }
}

impl Default for RandomSlugs<rand::rngs::ThreadRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> RandomSlugs<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> SlugMinter for RandomSlugs<R> {
    fn mint(&mut self, _path: &[&str]) -> String {
        slug_from(|| self.rng.gen_range(0..26u8))
    }
}
