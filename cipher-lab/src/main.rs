//! Command-line front end of the cipher lab
//!
//! Every subcommand reads a JSON request (from `--file` or stdin), runs the
//! matching handler and writes the JSON response (to `--output` or stdout).
//! Failures are written as `{"error": ...}` and exit with status 1.

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use cipher_lab::{render_error, Endpoint, Lab, LabConfig, LabError};
use clap::{Args, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Command-line arguments for the cipher lab.
#[derive(Parser, Debug)]
#[command(name = "cipher-lab", version, about = "Block cipher and classical cipher lab")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Directory with english_{mono,bi,tri,quad}grams.txt
    #[arg(long, global = true, env = "CIPHER_LAB_NGRAMS")]
    ngrams: Option<PathBuf>,

    /// Seed for the substitution solver
    #[arg(long, global = true, env = "CIPHER_LAB_SEED")]
    seed: Option<u64>,

    /// Wall-clock budget for one substitution solve, in milliseconds
    #[arg(long, global = true)]
    deadline_ms: Option<u64>,

    /// Solver worker threads (0 = one per core)
    #[arg(long, global = true)]
    workers: Option<usize>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Input and output of one request.
#[derive(Args, Debug)]
struct IoArgs {
    /// Path to the JSON request (stdin when omitted)
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Path to the output file (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// DES encryption: {plaintext, keyHex, mode, ivHex?}
    DesEncrypt(IoArgs),
    /// DES decryption: {ciphertextHex | ciphertextBase64, keyHex, mode, ivHex?}
    DesDecrypt(IoArgs),
    /// AES encryption, key size from the key length
    AesEncrypt(IoArgs),
    /// AES decryption
    AesDecrypt(IoArgs),
    /// Caesar brute force: {ciphertext}
    Caesar(IoArgs),
    /// Vigenère key recovery: {ciphertext}
    Vigenere(IoArgs),
    /// Letter frequency table: {ciphertext}
    Stats(IoArgs),
    /// Frequency-seeded substitution mapping: {ciphertext}
    InitMapping(IoArgs),
    /// Decrypt with a given mapping: {ciphertext, mapping}
    ApplyMapping(IoArgs),
    /// Automatic substitution solve: {ciphertext, algorithm?, restarts?, ...}
    AutoSolve(IoArgs),
    /// Random key: {cipher: des | aes128 | aes192 | aes256}
    Keygen(IoArgs),
}

impl Command {
    fn split(&self) -> (Endpoint, &IoArgs) {
        match self {
            Command::DesEncrypt(args) => (Endpoint::DesEncrypt, args),
            Command::DesDecrypt(args) => (Endpoint::DesDecrypt, args),
            Command::AesEncrypt(args) => (Endpoint::AesEncrypt, args),
            Command::AesDecrypt(args) => (Endpoint::AesDecrypt, args),
            Command::Caesar(args) => (Endpoint::CaesarBruteforce, args),
            Command::Vigenere(args) => (Endpoint::VigenereSolve, args),
            Command::Stats(args) => (Endpoint::MonoStats, args),
            Command::InitMapping(args) => (Endpoint::MonoInitMapping, args),
            Command::ApplyMapping(args) => (Endpoint::MonoApplyMapping, args),
            Command::AutoSolve(args) => (Endpoint::MonoAutoSolve, args),
            Command::Keygen(args) => (Endpoint::Keygen, args),
        }
    }
}

impl Cli {
    fn lab_config(&self) -> LabConfig {
        let mut config = LabConfig {
            ngram_dir: self.ngrams.clone(),
            ..LabConfig::default()
        };
        if let Some(seed) = self.seed {
            config.solver.seed = seed;
        }
        if let Some(workers) = self.workers {
            config.solver.workers = workers;
        }
        config.solver.deadline = self.deadline_ms.map(Duration::from_millis);
        config
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "cipher_lab=debug,classical=debug,cipher_modes=debug" } else { "cipher_lab=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn read_request(args: &IoArgs) -> Result<String, LabError> {
    match &args.file {
        Some(path) => Ok(fs::read_to_string(path)?),
        None => {
            let mut body = String::new();
            io::stdin().read_to_string(&mut body)?;
            Ok(body)
        }
    }
}

fn write_response(args: &IoArgs, body: &str) -> Result<(), LabError> {
    match &args.output {
        Some(path) => fs::write(path, format!("{body}\n"))?,
        None => writeln!(io::stdout().lock(), "{body}")?,
    }
    Ok(())
}

fn run(cli: &Cli) -> Result<String, LabError> {
    let (endpoint, args) = cli.command.split();
    let mut lab = Lab::new(cli.lab_config())?;
    let body = read_request(args)?;
    debug!(%endpoint, "request read");
    lab.dispatch(endpoint, &body)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let (_, args) = cli.command.split();
    let (body, code) = match run(&cli) {
        Ok(body) => (body, ExitCode::SUCCESS),
        Err(err) => {
            tracing::error!(error = %err, "request failed");
            (render_error(&err), ExitCode::FAILURE)
        }
    };

    if let Err(err) = write_response(args, &body) {
        eprintln!("Failed to write output: {err}");
        return ExitCode::FAILURE;
    }
    code
}
