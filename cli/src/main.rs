//! Command-line entry point gluing `obscura-wallet`, `obscura-core`, and
//! `obscura-network` together.

mod config;

use std::fs;
use std::time::Duration;

use clap::{Parser, Subcommand};
use log::info;

use obscura_core::error::Result;
use obscura_core::script::{hash160, p2pkh_locking_script};
use obscura_core::ser;
use obscura_core::tx::Outpoint;
use obscura_core::{SpendableOutput, TxBuilder};
use obscura_network::MinerClient;
use obscura_wallet::Keystore;

use config::NetworkConfig;

#[derive(Parser)]
#[command(name = "obscura")]
#[command(about = "Obscura BSV wallet CLI", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a fresh key and print its address (HASH160, hex).
    Keygen,
    /// Build, fund, sign, and optionally broadcast a spend from one UTXO to
    /// one payee, printing the raw transaction hex.
    Send {
        /// Outpoint being spent, `hash:index`.
        #[arg(long)]
        utxo: String,
        /// Satoshi value of the spent output.
        #[arg(long)]
        utxo_value: u64,
        /// HASH160 (hex) of the key that can spend the UTXO.
        #[arg(long)]
        utxo_pubkey_hash: String,
        /// HASH160 (hex) of the payee.
        #[arg(long)]
        payee_pubkey_hash: String,
        /// Amount to send, in satoshis.
        #[arg(long)]
        amount: u64,
        /// HASH160 (hex) receiving any change.
        #[arg(long)]
        change_pubkey_hash: String,
        /// Fee rate in satoshis per byte.
        #[arg(long, default_value_t = 0.5)]
        fee_rate: f64,
        /// Dust fee rate in satoshis per byte.
        #[arg(long, default_value_t = 0.25)]
        dust_fee_rate: f64,
        /// Path to a `NetworkConfig` TOML file; when set, broadcasts via
        /// the miner API instead of only printing the raw hex.
        #[arg(long)]
        network_config: Option<String>,
    },
}

fn hex_hash160(s: &str) -> Result<[u8; 20]> {
    let bytes = hex::decode(s).map_err(|_| obscura_core::error::Error::CorruptedData("invalid hex"))?;
    if bytes.len() != 20 {
        return Err(obscura_core::error::Error::CorruptedData("hash160 must be 20 bytes"));
    }
    let mut out = [0u8; 20];
    out.copy_from_slice(&bytes);
    Ok(out)
}

async fn run_send(
    utxo: String,
    utxo_value: u64,
    utxo_pubkey_hash: String,
    payee_pubkey_hash: String,
    amount: u64,
    change_pubkey_hash: String,
    fee_rate: f64,
    dust_fee_rate: f64,
    network_config: Option<String>,
) -> Result<()> {
    let mut keystore = Keystore::new();
    let funder_hash = hex_hash160(&utxo_pubkey_hash)?;
    // A real wallet would already hold this key; the CLI only demonstrates
    // the build/fund/sign/broadcast path, so it generates one and reports
    // it rather than pretending to already own the spent output.
    let generated_pubkey = keystore.generate("spend-key");
    let actual_hash = hash160(&generated_pubkey);
    if actual_hash != funder_hash {
        info!("generated key does not match --utxo-pubkey-hash; import the real key via the wallet crate for a live spend");
    }

    let outpoint: Outpoint = utxo
        .parse()
        .map_err(|_| obscura_core::error::Error::CorruptedData("invalid outpoint"))?;
    let payee_script = p2pkh_locking_script(&hex_hash160(&payee_pubkey_hash)?);
    let change_script = p2pkh_locking_script(&hex_hash160(&change_pubkey_hash)?);

    let mut builder = TxBuilder::new(fee_rate, dust_fee_rate);
    builder.set_change_locking_script(change_script, None);
    builder.add_output(payee_script.clone(), amount)?;

    let candidate = SpendableOutput {
        outpoint,
        locking_script: p2pkh_locking_script(&funder_hash),
        value: utxo_value,
        key_id: Some("spend-key".into()),
    };
    builder.add_funding(&[candidate])?;
    builder.sign(&keystore)?;

    let raw_tx = ser::serialize_tx(builder.transaction());
    println!("{}", hex::encode(&raw_tx));

    if let Some(path) = network_config {
        let text = fs::read_to_string(&path).map_err(obscura_core::error::Error::Io)?;
        let cfg: NetworkConfig = toml::from_str(&text)
            .map_err(|_| obscura_core::error::Error::CorruptedData("invalid network config"))?;
        let client = MinerClient::new(cfg.base_url, cfg.auth_token);
        let (_, response) = client
            .submit_tx(hex::encode(&raw_tx), Duration::from_millis(cfg.timeout_ms))
            .await?;
        println!("broadcast result: {} ({})", response.return_result, response.return_description);
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Keygen => {
            let mut keystore = Keystore::new();
            let pubkey = keystore.generate("key-0");
            println!("pubkey: {}", hex::encode(&pubkey));
            println!("hash160: {}", hex::encode(hash160(&pubkey)));
            Ok(())
        }
        Commands::Send {
            utxo,
            utxo_value,
            utxo_pubkey_hash,
            payee_pubkey_hash,
            amount,
            change_pubkey_hash,
            fee_rate,
            dust_fee_rate,
            network_config,
        } => {
            run_send(
                utxo,
                utxo_value,
                utxo_pubkey_hash,
                payee_pubkey_hash,
                amount,
                change_pubkey_hash,
                fee_rate,
                dust_fee_rate,
                network_config,
            )
            .await
        }
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
