//! Anonymous Credential-Set Membership Proof demo.
//!
//! Walks the full protocol end to end against an in-process
//! `MembershipSystem`: circuit setup, credential set creation, trusted root
//! registration, proof generation, and verification — followed by a sweep
//! of the rejection scenarios a verifier is expected to catch.
//!
//! Run with: cargo run --release
//! For the rejection-scenario sweep only: cargo run --release -- --scenarios-only

use ark_std::rand::rngs::StdRng;
use ark_std::rand::SeedableRng;
use clap::{ArgAction, Parser};
use credential_membership::api::types::{
    CreateSetRequest, GenerateProofRequest, RegisterTrustedRootRequest, VerifyProofRequest,
};
use credential_membership::api::MembershipSystem;
use credential_membership::config::CircuitConfig;
use credential_membership::credential_set::CredentialSetType;
use tracing::{error, info, info_span};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Command-line arguments for the membership proof demo.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory to generate/read the circuit's proving and verifying keys.
    #[arg(long, default_value = "./circuits")]
    circuit_dir: String,

    /// Credential this demo proves membership for.
    #[arg(long, default_value = "bob")]
    credential: String,

    /// Skip the straight-line demo and only run the rejection scenarios.
    #[arg(long, default_value_t = false)]
    scenarios_only: bool,

    /// Increase output verbosity (-v for DEBUG, -vv for TRACE)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

const DEMO_SEED: u64 = 20260101;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    info!("");
    info!("╔══════════════════════════════════════════════════════════════╗");
    info!("║   Anonymous Credential-Set Membership Proof Demo             ║");
    info!("║   Poseidon Merkle Commitments + Groth16 zk-SNARKs            ║");
    info!("╚══════════════════════════════════════════════════════════════╝");
    info!("");

    let system = MembershipSystem::new("membership");

    info!("[1/4] Circuit Setup");
    setup_circuit(&system, &cli.circuit_dir);
    info!("");

    if !cli.scenarios_only {
        info!("[2/4] Credential Set & Trusted Root");
        let (set_id, root) = create_voter_set(&system);
        info!("");

        info!("[3/4] Proof Generation");
        let proof = prove_membership(&system, set_id, &cli.credential);
        info!("");

        info!("[4/4] Verification");
        verify_and_report(&system, proof);
        info!("");
        let _ = root;
    }

    info!("═══════════════════════════════════════════════════════════════");
    info!("REJECTION SCENARIOS");
    info!("═══════════════════════════════════════════════════════════════");
    info!("");
    run_rejection_scenarios(&cli.circuit_dir);
}

fn setup_circuit(system: &MembershipSystem, circuit_dir: &str) {
    let _span = info_span!("circuit_setup").entered();
    let config = CircuitConfig::new("membership", circuit_dir);
    if config.proving_key_path().exists() && config.verifying_key_path().exists() {
        system.load_circuit(&config).unwrap();
        info!("  ✓ Loaded existing circuit artifacts from {}", circuit_dir);
    } else {
        system
            .generate_and_store_circuit(&config, DEMO_SEED)
            .unwrap();
        info!("  ✓ Ran trusted setup, wrote artifacts to {}", circuit_dir);
    }
}

fn create_voter_set(system: &MembershipSystem) -> (uuid::Uuid, String) {
    let _span = info_span!("credential_set").entered();
    let credentials: Vec<String> = ["alice", "bob", "carol", "dave", "erin"]
        .iter()
        .map(|s| s.to_string())
        .collect();

    let created = system
        .create_set(CreateSetRequest {
            name: "2026-general-election-voters".to_string(),
            description: Some("Eligible voter roll for the demo election".to_string()),
            set_type: CredentialSetType::Voters,
            credentials: credentials.clone(),
        })
        .unwrap();

    info!(
        "  ✓ Created credential set {} with {} credentials",
        created.set_id, created.credential_count
    );
    info!("  ✓ Merkle root: {}", created.root);

    system
        .register_trusted_root(RegisterTrustedRootRequest {
            set_id: created.set_id,
            root: created.root.clone(),
            expires_at: None,
        })
        .unwrap();
    info!("  ✓ Registered root as trusted, no expiry");

    (created.set_id, created.root)
}

fn prove_membership(
    system: &MembershipSystem,
    set_id: uuid::Uuid,
    credential: &str,
) -> credential_membership::proof::Proof {
    let _span = info_span!("proof_generation", credential).entered();
    let mut rng = StdRng::seed_from_u64(DEMO_SEED);
    let response = system
        .generate_proof(
            GenerateProofRequest {
                set_id,
                credential: credential.to_string(),
            },
            &mut rng,
        )
        .unwrap();

    info!("  ✓ Generated proof {}", response.proof.metadata.proof_id);
    info!(
        "  ✓ Proof expires at {}",
        response.proof.metadata.expires_at
    );
    response.proof
}

fn verify_and_report(system: &MembershipSystem, proof: credential_membership::proof::Proof) {
    let _span = info_span!("verification").entered();
    let outcome = system.verify_proof(VerifyProofRequest { proof }).unwrap();

    if outcome.valid {
        info!(
            "  ✓ Proof is valid — caller is a member of set {}",
            outcome.credential_set_id.map(|id| id.to_string()).unwrap_or_default()
        );
        info!("  ✓ The verifier never learned which credential it was");
    } else {
        error!("  ✗ Proof rejected: {:?}", outcome.errors);
        std::process::exit(1);
    }
}

/// Demonstrates each normative rejection path against a freshly loaded
/// circuit and a fresh, isolated `MembershipSystem`.
fn run_rejection_scenarios(circuit_dir: &str) {
    let system = MembershipSystem::new("membership");
    let config = CircuitConfig::new("membership", circuit_dir);
    system.load_circuit(&config).unwrap();

    let created = system
        .create_set(CreateSetRequest {
            name: "scenario-set".to_string(),
            description: None,
            set_type: CredentialSetType::AllowList,
            credentials: vec!["alice".into(), "bob".into(), "carol".into()],
        })
        .unwrap();

    // Scenario: untrusted root (never registered).
    {
        let mut rng = StdRng::seed_from_u64(DEMO_SEED + 1);
        let proof = system
            .generate_proof(
                GenerateProofRequest {
                    set_id: created.set_id,
                    credential: "alice".to_string(),
                },
                &mut rng,
            )
            .unwrap()
            .proof;
        let outcome = system
            .verify_proof(VerifyProofRequest { proof })
            .unwrap();
        info!("  • untrusted root        -> valid={} errors={:?}", outcome.valid, outcome.errors);
    }

    system
        .register_trusted_root(RegisterTrustedRootRequest {
            set_id: created.set_id,
            root: created.root.clone(),
            expires_at: None,
        })
        .unwrap();

    // Scenario: non-member credential is rejected before a proof ever exists.
    {
        let mut rng = StdRng::seed_from_u64(DEMO_SEED + 2);
        let err = system
            .generate_proof(
                GenerateProofRequest {
                    set_id: created.set_id,
                    credential: "mallory".to_string(),
                },
                &mut rng,
            )
            .unwrap_err();
        info!("  • non-member credential -> rejected at proving time: {}", err.kind());
    }

    // Scenario: expired proof.
    {
        let mut rng = StdRng::seed_from_u64(DEMO_SEED + 3);
        let mut proof = system
            .generate_proof(
                GenerateProofRequest {
                    set_id: created.set_id,
                    credential: "bob".to_string(),
                },
                &mut rng,
            )
            .unwrap()
            .proof;
        proof.metadata.timestamp -= chrono::Duration::hours(48);
        proof.metadata.expires_at = proof.metadata.timestamp + chrono::Duration::seconds(1);
        let outcome = system
            .verify_proof(VerifyProofRequest { proof })
            .unwrap();
        info!("  • expired proof         -> valid={} errors={:?}", outcome.valid, outcome.errors);
    }

    // Scenario: a sound, fresh, trusted proof verifies.
    {
        let mut rng = StdRng::seed_from_u64(DEMO_SEED + 4);
        let proof = system
            .generate_proof(
                GenerateProofRequest {
                    set_id: created.set_id,
                    credential: "carol".to_string(),
                },
                &mut rng,
            )
            .unwrap()
            .proof;
        let outcome = system
            .verify_proof(VerifyProofRequest { proof })
            .unwrap();
        info!("  • sound trusted proof   -> valid={} errors={:?}", outcome.valid, outcome.errors);
    }

    info!("");
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "info,credential_membership=info",
        1 => "debug,credential_membership=debug",
        _ => "credential_membership=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    use tracing_tree::HierarchicalLayer;

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            HierarchicalLayer::new(2)
                .with_targets(false)
                .with_bracketed_fields(true),
        )
        .init();
}
