use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use signless_vault::error::Result;
use signless_vault::storage::file::FileStorage;
use signless_vault::vault::{
    AuthMethod, PaymentRequest, SetupParams, UnlockParams, VaultConfig, VaultManager, VaultStatus,
};

#[derive(Parser)]
#[command(name = "signless-vault")]
#[command(about = "Signless payment-authorization vault (PIN factor, file-backed)")]
#[command(version)]
struct Cli {
    /// Directory holding vault records.
    #[arg(long, default_value = ".signless-vault", global = true)]
    data_dir: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a vault for a wallet address, protected by a PIN
    Setup {
        #[arg(long)]
        wallet: String,
        #[arg(long)]
        pin: String,
    },
    /// Show vault status for a wallet address
    Status {
        #[arg(long)]
        wallet: String,
    },
    /// Unlock with the PIN and sign a payment payload
    Sign {
        #[arg(long)]
        wallet: String,
        #[arg(long)]
        pin: String,
        #[arg(long)]
        recipient: String,
        #[arg(long)]
        amount: String,
        #[arg(long)]
        token: Option<String>,
        #[arg(long)]
        payload: Option<String>,
    },
    /// Delete the vault for a wallet address
    Reset {
        #[arg(long)]
        wallet: String,
    },
    /// List wallet addresses with a stored vault
    Wallets,
}

fn open_manager(data_dir: &str) -> Result<VaultManager> {
    let storage = FileStorage::new(data_dir)?;
    let config = VaultConfig {
        enabled: true,
        auth_method: AuthMethod::Pin,
        ..VaultConfig::default()
    };
    Ok(VaultManager::new(
        config,
        Box::new(storage),
        Box::new(signless_vault::authenticator::software::SoftwareAuthenticator::new()),
    ))
}

async fn run(cli: Cli) -> Result<()> {
    let mut manager = open_manager(&cli.data_dir)?;

    match cli.command {
        Commands::Setup { wallet, pin } => {
            manager.set_wallet_address(Some(&wallet));
            if manager.state().status == VaultStatus::Locked {
                println!("A vault already exists for {wallet}; re-running setup replaces it.");
            }
            manager
                .setup(SetupParams {
                    auth_method: AuthMethod::Pin,
                    pin: Some(pin),
                })
                .await?;
            let state = manager.state();
            println!("Vault created for {wallet}");
            println!("Public key (base64): {}", state.public_key.unwrap_or_default());
        }
        Commands::Status { wallet } => {
            manager.set_wallet_address(Some(&wallet));
            let state = manager.state();
            println!("Wallet:      {wallet}");
            println!("Status:      {:?}", state.status);
            println!("Auth method: {:?}", state.auth_method);
            if let Some(public_key) = state.public_key {
                println!("Public key:  {public_key}");
            }
        }
        Commands::Sign {
            wallet,
            pin,
            recipient,
            amount,
            token,
            payload,
        } => {
            manager.set_wallet_address(Some(&wallet));
            manager.unlock(UnlockParams { pin: Some(pin) }).await?;
            let signed = manager.sign_payload(PaymentRequest {
                recipient,
                amount,
                token,
                payload,
                ..Default::default()
            })?;

            let out = serde_json::json!({
                "payload": String::from_utf8_lossy(&signed.payload),
                "signature": hex::encode(signed.signature),
                "publicKey": signed.public_key,
                "reference": signed.reference,
                "validUntil": signed.valid_until,
            });
            println!("{}", serde_json::to_string_pretty(&out).unwrap_or_default());
        }
        Commands::Reset { wallet } => {
            manager.set_wallet_address(Some(&wallet));
            manager.reset();
            println!("Vault removed for {wallet}");
        }
        Commands::Wallets => {
            let wallets = manager.list_wallets();
            if wallets.is_empty() {
                println!("No vaults stored.");
            } else {
                for wallet in wallets {
                    println!("{wallet}");
                }
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
