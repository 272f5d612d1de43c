//! One-shot bootstrap for the first admin account. Later admins are
//! created through `POST /api/admins/create` by an existing admin.

use clap::Parser;

use nhatro_api::database::manager::DatabaseManager;
use nhatro_api::services::account_service::{self, Registration};

#[derive(Parser)]
#[command(name = "create-admin")]
#[command(about = "Seed an admin account directly in the database")]
struct Cli {
    #[arg(long)]
    email: String,

    #[arg(long)]
    password: String,

    #[arg(long)]
    full_name: String,

    #[arg(long)]
    phone_number: Option<String>,

    #[arg(long)]
    department: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    DatabaseManager::migrate().await?;
    let pool = DatabaseManager::pool().await?;

    let admin = account_service::create_admin(
        pool,
        Registration {
            email: cli.email,
            password: cli.password,
            full_name: cli.full_name,
            phone_number: cli.phone_number,
        },
        cli.department.as_deref(),
    )
    .await
    .map_err(|err| anyhow::anyhow!("{err}"))?;

    println!("Created admin {} ({})", admin.email, admin.id);
    Ok(())
}
