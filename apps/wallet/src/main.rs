use std::{path::PathBuf, sync::Arc};

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use client_core::{MemorySessionPersistence, NoticeLevel, SessionPersistence, WalletClient, WalletEvent};
use shared::domain::{CouponFilter, CouponId};
use storage::Storage;
use tokio::sync::broadcast;

mod config;
mod render;
mod scanner_input;
mod views;

#[derive(Parser, Debug)]
#[command(name = "wallet", about = "Keep deposit-return coupons in one place")]
struct Cli {
    /// Backend base URL; overrides wallet.toml and the environment.
    #[arg(long)]
    api_url: Option<String>,
    /// Where the session token is kept between runs.
    #[arg(long)]
    database_url: Option<String>,
    /// Keep the session in memory only.
    #[arg(long)]
    ephemeral: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Signup {
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        password: String,
        #[arg(long)]
        confirm_password: String,
    },
    VerifyOtp {
        #[arg(long)]
        email: String,
        #[arg(long)]
        otp: String,
    },
    ResendOtp {
        #[arg(long)]
        email: String,
    },
    Signin {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    ForgotPassword {
        #[arg(long)]
        email: String,
    },
    ResetPassword {
        #[arg(long)]
        email: String,
        #[arg(long)]
        otp: String,
        #[arg(long)]
        new_password: String,
        #[arg(long)]
        confirm_password: String,
    },
    Logout,
    Whoami,
    /// Dashboard with coupon counts.
    Home,
    Coupons {
        #[arg(long, value_enum, default_value_t = ListFilter::All)]
        filter: ListFilter,
    },
    /// Read a barcode from the scanner (stdin or a serial device) and save it.
    Scan {
        /// Skip the scanner and save this barcode.
        #[arg(long)]
        manual: Option<String>,
        #[arg(long)]
        device: Option<PathBuf>,
        #[arg(long)]
        value: Option<f64>,
        #[arg(long, requires = "value")]
        currency: Option<String>,
    },
    /// Show a coupon for redemption at the counter.
    Payout {
        coupon: Option<CouponId>,
        #[arg(long, requires = "coupon")]
        mark_used: bool,
    },
    Delete {
        coupon: CouponId,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ListFilter {
    All,
    Unused,
    Used,
}

impl From<ListFilter> for CouponFilter {
    fn from(filter: ListFilter) -> Self {
        match filter {
            ListFilter::All => CouponFilter::All,
            ListFilter::Unused => CouponFilter::Unused,
            ListFilter::Used => CouponFilter::Used,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut settings = config::load_settings()?;
    if let Some(url) = cli.api_url {
        settings.api_base_url = url;
    }
    if let Some(url) = cli.database_url {
        settings.database_url = url;
    }

    tracing_subscriber::fmt()
        .with_env_filter(settings.log_filter.as_str())
        .with_writer(std::io::stderr)
        .init();

    let persistence: Arc<dyn SessionPersistence> = if cli.ephemeral {
        Arc::new(MemorySessionPersistence::default())
    } else {
        let database_url = config::normalize_database_url(&settings.database_url);
        Arc::new(Storage::new(&database_url).await?)
    };
    let client = WalletClient::new(&settings.api_base_url, persistence)?;
    let mut events = client.subscribe_events();

    let result = dispatch(&client, cli.command).await;
    print_notices(&mut events);
    result
}

async fn dispatch(client: &WalletClient, command: Command) -> Result<()> {
    match command {
        Command::Signup {
            email,
            name,
            password,
            confirm_password,
        } => views::signup(client, &email, name.as_deref(), &password, &confirm_password).await,
        Command::VerifyOtp { email, otp } => views::verify_otp(client, &email, &otp).await,
        Command::ResendOtp { email } => views::resend_otp(client, &email).await,
        Command::Signin { email, password } => views::signin(client, &email, &password).await,
        Command::ForgotPassword { email } => views::forgot_password(client, &email).await,
        Command::ResetPassword {
            email,
            otp,
            new_password,
            confirm_password,
        } => views::reset_password(client, &email, &otp, &new_password, &confirm_password).await,
        Command::Logout => views::logout(client).await,
        Command::Whoami => views::whoami(client).await,
        Command::Home => views::home(client).await,
        Command::Coupons { filter } => views::coupons(client, filter.into()).await,
        Command::Scan {
            manual,
            device,
            value,
            currency,
        } => {
            views::scan(
                client,
                views::ScanArgs {
                    manual,
                    device,
                    value,
                    currency,
                },
            )
            .await
        }
        Command::Payout { coupon, mark_used } => views::payout(client, coupon, mark_used).await,
        Command::Delete { coupon } => views::delete(client, coupon).await,
    }
}

fn print_notices(events: &mut broadcast::Receiver<WalletEvent>) {
    while let Ok(event) = events.try_recv() {
        if let WalletEvent::Notice { level, message } = event {
            match level {
                NoticeLevel::Success => eprintln!("ok: {message}"),
                NoticeLevel::Error => eprintln!("error: {message}"),
            }
        }
    }
}
