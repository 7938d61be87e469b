//! Interactive CLI demo of the SID identity lifecycle.
//!
//! Walks through wallet recovery, identity creation, verification, a
//! tamper attempt, a version-chained update, and DID Document export. The
//! output uses ANSI escape codes for colored, storytelling-style terminal
//! rendering; library events go to stderr through `tracing`.
//!
//! Run with:
//!   cargo run --example demo --release
//!
//! Set `RUST_LOG=sid_protocol=debug` to see lifecycle events, and
//! `SID_LOG_FORMAT=json` for JSON log lines.

use std::time::Instant;

use anyhow::{bail, Context, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use sid_protocol::config::{IdentityConfig, DIGEST_ALGORITHM, SIGNING_ALGORITHM};
use sid_protocol::identity::{
    create, derive_from_mnemonic, derive_random_with_config, update, verify, IdentityTemplate,
    OrganizationExtend, PersonalExtend, ProfileExtension, SecurityConfig, SidDid, Wordlist,
};

// ---------------------------------------------------------------------------
// ANSI color constants
// ---------------------------------------------------------------------------

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const MAGENTA: &str = "\x1b[35m";
const CYAN: &str = "\x1b[36m";
const WHITE: &str = "\x1b[37m";

const BG_BLUE: &str = "\x1b[44m";

// ---------------------------------------------------------------------------
// Display helpers
// ---------------------------------------------------------------------------

fn banner() {
    println!();
    println!("{BG_BLUE}{BOLD}{WHITE}                                                                    {RESET}");
    println!("{BG_BLUE}{BOLD}{WHITE}    SID PROTOCOL  --  Identity Lifecycle Demo                       {RESET}");
    println!("{BG_BLUE}{BOLD}{WHITE}    secp256k1 ECDSA  |  SHA-256  |  BIP-39/32  |  did:sid           {RESET}");
    println!("{BG_BLUE}{BOLD}{WHITE}                                                                    {RESET}");
    println!();
}

fn section(num: u32, title: &str) {
    println!();
    println!("{BOLD}{CYAN}===[{YELLOW} Step {num} {CYAN}]=============================================================={RESET}");
    println!("{BOLD}{WHITE}  {title}{RESET}");
    println!("{CYAN}------------------------------------------------------------------------{RESET}");
}

fn success(text: &str) {
    println!("{GREEN}  [OK] {text}{RESET}");
}

fn rejected(text: &str) {
    println!("{RED}  [REJECTED] {text}{RESET}");
}

fn info(label: &str, value: &str) {
    println!("{WHITE}  {BOLD}{label}:{RESET} {YELLOW}{value}{RESET}");
}

fn timing(label: &str, elapsed: std::time::Duration) {
    let ms = elapsed.as_secs_f64() * 1000.0;
    println!("{DIM}{MAGENTA}  [{label}: {ms:.2} ms]{RESET}");
}

fn init_logging() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sid_protocol=info"));
    let json = std::env::var("SID_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    init_logging();
    banner();

    let config = IdentityConfig::default();
    config.validate().context("default config is invalid")?;

    // -- Step 1 -------------------------------------------------------------
    section(1, "Recover a wallet from its mnemonic");
    let phrase = "abandon abandon abandon abandon abandon abandon \
                  abandon abandon abandon abandon abandon about";
    let start = Instant::now();
    let alice = derive_from_mnemonic(phrase, "", &config.derivation_path, Wordlist::English)
        .context("recovering alice's wallet")?;
    timing("derive", start.elapsed());
    info("Path", alice.path());
    info("Address", alice.address());
    info("Public key", &alice.public_key().to_hex());

    // -- Step 2 -------------------------------------------------------------
    section(2, "Create a personal identity");
    let template = IdentityTemplate::new(
        "alice",
        ProfileExtension::Personal(PersonalExtend {
            first_name: "Alice".into(),
            last_name: "Liddell".into(),
            email: "alice@example.org".into(),
            ..PersonalExtend::default()
        }),
    )
    .network(config.network)
    .description("wonderland resident")
    .security_config(SecurityConfig::new(b"recovery=social;threshold=2".to_vec()));

    let start = Instant::now();
    let v0 = create(&alice, vec![0x42; 32], &template)?;
    timing("create", start.elapsed());
    info("DID", &v0.metadata.did);
    info("Version", &v0.metadata.version.to_string());
    info("Signature", &format!("{SIGNING_ALGORITHM} over {DIGEST_ALGORITHM}"));
    info("Signature hex", &v0.signature);

    // -- Step 3 -------------------------------------------------------------
    section(3, "Verify, then tamper");
    if verify(&v0)? {
        success("signature matches the key inside the DID");
    } else {
        bail!("freshly created identity failed verification");
    }

    let mut forged = v0.clone();
    forged.metadata.name = "mallory".into();
    if verify(&forged)? {
        bail!("tampered identity verified");
    }
    rejected("renamed copy no longer verifies");

    // -- Step 4 -------------------------------------------------------------
    section(4, "Update: alice registers a company");
    let company = IdentityTemplate::new(
        "alice-labs",
        ProfileExtension::Organization(OrganizationExtend {
            legal_name: "Alice Labs Ltd".into(),
            jurisdiction: "GB".into(),
            ..OrganizationExtend::default()
        }),
    );
    let start = Instant::now();
    let v1 = update(&company, &v0, &alice)?;
    timing("update", start.elapsed());
    info("Version", &format!("{} -> {}", v0.metadata.version, v1.metadata.version));
    info("Code", &format!("{} -> {}", v0.metadata.code, v1.metadata.code));
    info("Created", &v1.metadata.created.to_rfc3339());
    info("Checkpoint", &v1.metadata.checkpoint.to_rfc3339());
    if !verify(&v0)? {
        bail!("update disturbed the previous version");
    }
    success("previous version still verifies");

    // -- Step 5 -------------------------------------------------------------
    section(5, "Someone else tries to update alice's identity");
    let bob = derive_random_with_config("", &config)?;
    info("Intruder", bob.address());
    match update(&company, &v1, &bob) {
        Ok(_) => bail!("foreign key produced an update"),
        Err(e) => rejected(&e.to_string()),
    }

    // -- Step 6 -------------------------------------------------------------
    section(6, "Export the W3C DID Document");
    let did: SidDid = v1.metadata.did.parse()?;
    let document = did.to_did_document();
    document.validate()?;
    println!("{DIM}{}{RESET}", document.to_json()?);

    println!();
    success("demo complete");
    Ok(())
}
