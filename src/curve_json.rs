//! Shared snarkjs-compatible decimal-string encoding for BN254 curve points.
//!
//! Both the verifying key ([`crate::artifacts::VerifyingKeyJson`]) and a
//! generated proof ([`crate::proof::Groth16ProofJson`]) embed G1/G2 points
//! in this shape, so the conversion lives in one place.

use ark_bn254::{Fq, Fq2, G1Affine, G2Affine};
use ark_ff::{BigInteger, PrimeField};
use num_bigint::BigUint;

use crate::error::{CredentialError, Result};

pub fn fq_to_decimal(f: &Fq) -> String {
    BigUint::from_bytes_be(&f.into_bigint().to_bytes_be()).to_string()
}

pub fn decimal_to_fq(s: &str) -> Result<Fq> {
    let digits = s
        .parse::<BigUint>()
        .map_err(|_| CredentialError::InvalidProofStructure {
            reason: format!("not a decimal field element: {s}"),
        })?;
    Ok(Fq::from_be_bytes_mod_order(&digits.to_bytes_be()))
}

pub fn g1_to_json(p: &G1Affine) -> [String; 3] {
    [fq_to_decimal(&p.x), fq_to_decimal(&p.y), "1".to_string()]
}

pub fn g1_from_json(v: &[String; 3]) -> Result<G1Affine> {
    Ok(G1Affine::new_unchecked(decimal_to_fq(&v[0])?, decimal_to_fq(&v[1])?))
}

pub fn g2_to_json(p: &G2Affine) -> [[String; 2]; 3] {
    [
        [fq_to_decimal(&p.x.c0), fq_to_decimal(&p.x.c1)],
        [fq_to_decimal(&p.y.c0), fq_to_decimal(&p.y.c1)],
        ["1".to_string(), "0".to_string()],
    ]
}

pub fn g2_from_json(v: &[[String; 2]; 3]) -> Result<G2Affine> {
    let x = Fq2::new(decimal_to_fq(&v[0][0])?, decimal_to_fq(&v[0][1])?);
    let y = Fq2::new(decimal_to_fq(&v[1][0])?, decimal_to_fq(&v[1][1])?);
    Ok(G2Affine::new_unchecked(x, y))
}
