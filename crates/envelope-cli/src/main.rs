//! `envelope`: operator CLI for the envelope cipher.
//!
//! Startup sequence:
//! 1. Parse the command line.
//! 2. Load and validate [`config::Config`] from environment variables.
//! 3. Initialise structured JSON logging on stderr.
//! 4. Run the command; `encrypt` and `decrypt` load `APP_KEY` at this point.

mod config;
mod telemetry;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use envelope::{generate_key, Crypter};
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "envelope", version, about = "Encrypt and decrypt values with APP_KEY")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print a fresh application key in `base64:` form.
    GenerateKey,

    /// Encrypt a value into envelope text.
    Encrypt {
        /// Encrypt VALUE as a literal string instead of parsing it as JSON.
        #[arg(long)]
        raw: bool,
        /// The value to encrypt.
        value: String,
    },

    /// Decrypt envelope text.
    Decrypt {
        /// Print the plaintext as-is instead of deserialising it as JSON.
        #[arg(long)]
        raw: bool,
        /// The envelope text to decrypt.
        payload: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let cfg = config::Config::from_env().map_err(|e| {
        // Telemetry is not yet up; write to stderr directly.
        eprintln!("ERROR: configuration invalid: {e}");
        e
    })?;

    telemetry::init(&cfg.log_level)?;

    let output = run(cli.command)?;
    println!("{output}");
    Ok(())
}

fn run(command: Command) -> Result<String> {
    match command {
        Command::GenerateKey => {
            let key = generate_key();
            info!("generated application key");
            Ok(key.as_str().to_owned())
        }
        Command::Encrypt { raw, value } => {
            let crypter = load_crypter()?;
            let encrypted = if raw {
                crypter.encrypt_string(&value)
            } else {
                let parsed: serde_json::Value = serde_json::from_str(&value)
                    .context("VALUE is not valid JSON; pass --raw to encrypt it as a string")?;
                crypter.encrypt(&parsed)
            };
            encrypted.context("encryption failed")
        }
        Command::Decrypt { raw, payload } => {
            let crypter = load_crypter()?;
            if raw {
                crypter.decrypt_string(&payload).context("decryption failed")
            } else {
                let value: serde_json::Value =
                    crypter.decrypt(&payload).context("decryption failed")?;
                serde_json::to_string_pretty(&value).context("failed to render decrypted value")
            }
        }
    }
}

fn load_crypter() -> Result<Crypter> {
    Crypter::from_env().context("failed to load application key from APP_KEY")
}
