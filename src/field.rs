//! Field Hasher (C1): Poseidon over BN254's scalar field, plus the
//! domain-separated string-to-field encoding used for credential leaves.
//!
//! Mirrors the source crate's `poseidon.rs`: a lazily-initialized, process-wide
//! parameter table (here generated via arkworks' canonical Grain-LFSR
//! parameter search rather than neptune's precomputed tables) and a small
//! `domain_tags` module of named constants used to keep leaf and node hashing
//! from ever colliding.

use ark_bn254::Fr;
use ark_crypto_primitives::sponge::poseidon::{find_poseidon_ark_and_mds, PoseidonConfig};
use ark_crypto_primitives::sponge::{poseidon::PoseidonSponge, CryptographicSponge};
use ark_ff::{BigInteger, PrimeField};
use once_cell::sync::Lazy;
use sha2::{Digest, Sha256};

/// Rate-2 Poseidon parameters over BN254's scalar field, matching the
/// parameters the membership circuit is compiled against.
///
/// Generated once per process via the standard Grain-LFSR search
/// (`find_poseidon_ark_and_mds`) rather than loaded from a file: the
/// constants are a pure function of `(field, rate, full_rounds,
/// partial_rounds)`, so regenerating them is equivalent to loading them and
/// avoids shipping a constants blob that could drift from the circuit.
pub static POSEIDON_PARAMS: Lazy<PoseidonConfig<Fr>> = Lazy::new(|| {
    let full_rounds = 8;
    let partial_rounds = 57;
    let alpha = 5;
    let rate = 2;
    let capacity = 1;
    let (ark, mds) = find_poseidon_ark_and_mds::<Fr>(
        254,
        rate,
        full_rounds,
        partial_rounds,
        0,
    );
    PoseidonConfig::new(
        full_rounds as usize,
        partial_rounds as usize,
        alpha,
        mds,
        ark,
        rate,
        capacity,
    )
});

/// Domain-separation tags absorbed ahead of the hashed values so leaf and
/// node hashing can never collide even if an attacker can choose inputs to
/// either.
pub mod domain_tags {
    use super::Fr;
    use ark_ff::PrimeField;

    pub fn node() -> Fr {
        Fr::from(2u64)
    }

    pub fn leaf() -> Fr {
        Fr::from(1u64)
    }
}

/// Hashes an arbitrary number of field elements with Poseidon.
pub fn hash_n(xs: &[Fr]) -> Fr {
    let mut sponge = PoseidonSponge::new(&POSEIDON_PARAMS);
    sponge.absorb(&xs);
    let out: Vec<Fr> = sponge.squeeze_field_elements(1);
    out[0]
}

/// Domain-separated Poseidon hash of two field elements, in the order given.
/// Used for Merkle node hashing; the Merkle engine is responsible for
/// ordering its two children before calling this (see [`sorted_pair`]).
pub fn hash_pair(a: Fr, b: Fr) -> Fr {
    hash_n(&[domain_tags::node(), a, b])
}

/// Canonical big-endian byte representation of `f`, used only to compare
/// field elements by magnitude (field arithmetic itself has no order, but
/// the Merkle node formula needs a total order over canonical
/// representatives to make node hashing independent of tree position).
fn canonical_be_bytes(f: &Fr) -> Vec<u8> {
    f.into_bigint().to_bytes_be()
}

/// Orders two field elements by their canonical integer value, smallest
/// first, so the Merkle engine can compute `Poseidon₂(min(a,b), max(a,b))`
/// regardless of which child is physically on the left or right.
pub fn sorted_pair(a: Fr, b: Fr) -> (Fr, Fr) {
    if canonical_be_bytes(&a) <= canonical_be_bytes(&b) {
        (a, b)
    } else {
        (b, a)
    }
}

/// True iff `a`'s canonical integer value is strictly greater than `b`'s.
pub fn greater_than(a: &Fr, b: &Fr) -> bool {
    canonical_be_bytes(a) > canonical_be_bytes(b)
}

/// SHA-256 of the UTF-8 bytes of `s`, the 32-byte digest interpreted
/// big-endian and reduced modulo the BN254 scalar field prime.
///
/// This is the canonical credential leaf encoding (see the Merkle Engine's
/// design note on the leaf-hashing discrepancy): no further Poseidon pass is
/// applied here, the returned field element is used directly as both the
/// off-chain Merkle leaf and the in-circuit leaf signal.
pub fn str_to_field(s: &str) -> Fr {
    let digest = Sha256::digest(s.as_bytes());
    // `from_be_bytes_mod_order` reduces mod p, exactly matching "interpret
    // big-endian, reduce modulo p".
    Fr::from_be_bytes_mod_order(&digest)
}

/// Encodes a field element as 64 lowercase hex nibbles, big-endian, zero-padded.
pub fn field_to_hex64(f: &Fr) -> String {
    let bytes_le = f.into_bigint().to_bytes_le();
    let mut bytes_be = bytes_le;
    bytes_be.reverse();
    // BN254's scalar field fits in 32 bytes; pad on the left if the bigint's
    // big-endian representation is shorter.
    let mut padded = vec![0u8; 32usize.saturating_sub(bytes_be.len())];
    padded.extend_from_slice(&bytes_be);
    hex::encode(padded)
}

/// Decodes a 64-hex-nibble big-endian string back into a field element.
/// Returns `None` if `s` is not exactly 64 lowercase hex characters.
pub fn hex64_to_field(s: &str) -> Option<Fr> {
    if s.len() != 64 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let bytes = hex::decode(s).ok()?;
    Some(Fr::from_be_bytes_mod_order(&bytes))
}

/// Validates the wire encoding of a root/hash string without decoding it:
/// exactly 64 lowercase hex nibbles, matching `^[a-f0-9]{64}$`.
pub fn is_valid_hex64(s: &str) -> bool {
    s.len() == 64 && s.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}
