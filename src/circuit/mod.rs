//! Membership circuit: proves knowledge of a leaf and an inclusion path that
//! hash, level by level, to a public root.
//!
//! Off-chain, [`crate::merkle::reconstruct_root`] walks the witness by
//! comparing sibling magnitudes at each level and never looks at
//! `path_indices`. In-circuit, comparing two field elements costs
//! constraints, so this gadget instead conditionally-selects left/right off
//! the precomputed `path_indices` bit. The two walks agree only because
//! `path_indices` was itself derived from the same magnitude comparison when
//! the witness was built (`merkle::get_padded_proof_for_leaf`); see
//! `merkle::path_indices_orientation_matches_sorted_pair_hashing` for the
//! test establishing that.

use ark_bn254::Fr;
use ark_crypto_primitives::sponge::constraints::CryptographicSpongeVar;
use ark_crypto_primitives::sponge::poseidon::{constraints::PoseidonSpongeVar, PoseidonConfig};
use ark_r1cs_std::alloc::AllocVar;
use ark_r1cs_std::boolean::Boolean;
use ark_r1cs_std::eq::EqGadget;
use ark_r1cs_std::fields::fp::FpVar;
use ark_r1cs_std::select::CondSelectGadget;
use ark_relations::r1cs::{ConstraintSynthesizer, ConstraintSystemRef, SynthesisError};

use crate::config;
use crate::field::{domain_tags, POSEIDON_PARAMS};
use crate::merkle::MerkleWitness;

/// R1CS instance for one membership statement.
///
/// Public input: `root`. Private witnesses: `leaf`, `siblings`,
/// `path_indices`. All vectors are exactly `config::MERKLE_DEPTH` long; the
/// padding entries produced by [`crate::merkle::get_padded_proof_for_leaf`]
/// are ordinary witnesses here, not special-cased, because the same padded
/// walk was used to compute `root` off-circuit.
#[derive(Clone)]
pub struct MembershipCircuit {
    poseidon_params: PoseidonConfig<Fr>,
    leaf: Option<Fr>,
    siblings: Vec<Option<Fr>>,
    path_indices: Vec<Option<bool>>,
    root: Option<Fr>,
}

impl MembershipCircuit {
    /// Builds a circuit instance from a concrete witness and its claimed
    /// root, ready for proving.
    pub fn new(witness: &MerkleWitness, root: Fr) -> Self {
        Self {
            poseidon_params: POSEIDON_PARAMS.clone(),
            leaf: Some(witness.leaf),
            siblings: witness.siblings.iter().map(|s| Some(*s)).collect(),
            path_indices: witness.path_indices.iter().map(|b| Some(*b)).collect(),
            root: Some(root),
        }
    }

    /// Builds a structurally identical circuit with no witness values
    /// assigned, for Groth16 key generation. The constraint system only
    /// needs the circuit's shape at that stage, not real data.
    pub fn new_empty() -> Self {
        Self {
            poseidon_params: POSEIDON_PARAMS.clone(),
            leaf: None,
            siblings: vec![None; config::MERKLE_DEPTH],
            path_indices: vec![None; config::MERKLE_DEPTH],
            root: None,
        }
    }
}

impl ConstraintSynthesizer<Fr> for MembershipCircuit {
    fn generate_constraints(self, cs: ConstraintSystemRef<Fr>) -> Result<(), SynthesisError> {
        let root_var = FpVar::new_input(cs.clone(), || {
            self.root.ok_or(SynthesisError::AssignmentMissing)
        })?;

        let leaf_var = FpVar::new_witness(cs.clone(), || {
            self.leaf.ok_or(SynthesisError::AssignmentMissing)
        })?;

        let sibling_vars: Vec<FpVar<Fr>> = self
            .siblings
            .iter()
            .map(|s| FpVar::new_witness(cs.clone(), || s.ok_or(SynthesisError::AssignmentMissing)))
            .collect::<Result<_, _>>()?;

        let index_vars: Vec<Boolean<Fr>> = self
            .path_indices
            .iter()
            .map(|b| Boolean::new_witness(cs.clone(), || b.ok_or(SynthesisError::AssignmentMissing)))
            .collect::<Result<_, _>>()?;

        let node_tag = FpVar::new_constant(cs.clone(), domain_tags::node())?;

        let mut current = leaf_var;
        for (sibling, is_right) in sibling_vars.iter().zip(index_vars.iter()) {
            // is_right: current node sits on the right, so the sibling is
            // the left child. Mirrors merkle::reconstruct_root exactly.
            let left = FpVar::conditionally_select(is_right, sibling, &current)?;
            let right = FpVar::conditionally_select(is_right, &current, sibling)?;
            current = hash_pair_var(cs.clone(), &self.poseidon_params, &node_tag, &left, &right)?;
        }

        current.enforce_equal(&root_var)?;
        Ok(())
    }
}

/// In-circuit counterpart of `field::hash_pair`: absorbs the node domain tag
/// followed by the two children, squeezes one element.
fn hash_pair_var(
    cs: ConstraintSystemRef<Fr>,
    params: &PoseidonConfig<Fr>,
    tag: &FpVar<Fr>,
    left: &FpVar<Fr>,
    right: &FpVar<Fr>,
) -> Result<FpVar<Fr>, SynthesisError> {
    let mut sponge = PoseidonSpongeVar::new(cs, params);
    sponge.absorb(tag)?;
    sponge.absorb(left)?;
    sponge.absorb(right)?;
    let mut out = sponge.squeeze_field_elements(1)?;
    Ok(out.remove(0))
}
