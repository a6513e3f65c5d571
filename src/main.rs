//! # igame
//!
//! Command-line front-end of the iGame client.
//!
//! ## Environment Setup
//! Settings are read from the environment (a `.env` file is honoured):
//! ```bash
//! IGAME_API_URL=https://api.igame.ml
//! IGAME_TOKEN_FILE=~/.igame-tokens.json
//! RUST_LOG=igame_client=debug
//! ```
//!
//! ## Usage
//! ```bash
//! igame login --email player@example.com --password secret
//! igame apps --type game --limit 10
//! igame bonus
//! ```

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use igame_client::api::app::{AppListing, AppLookup, AppType};
use igame_client::api::resource::ProviderGroup;
use igame_client::config::CONFIG;
use igame_client::store::FileTokenStore;
use igame_client::{ApiError, ErrorInfo, IgameApi, Session};

#[derive(Parser)]
#[command(name = "igame", version, about = "iGame marketplace client")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Log in and persist the issued tokens
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Forget the stored tokens
    Logout,
    /// Show the logged-in user
    Whoami,
    /// List games or expansions
    Apps {
        #[arg(long = "type", default_value = "game")]
        app_type: AppType,
        #[arg(long, default_value_t = 0)]
        offset: i64,
        #[arg(long, default_value_t = 20)]
        limit: i64,
        #[arg(long, value_delimiter = ',')]
        tags: Vec<i64>,
    },
    /// Show one app and its resources
    App { id: i64 },
    /// Get a download link for a resource
    Download {
        resource_id: i64,
        #[arg(long)]
        fast: bool,
    },
    /// List notices
    Notices {
        #[arg(long, default_value_t = 0)]
        offset: i64,
        #[arg(long, default_value_t = 10)]
        limit: i64,
    },
    /// Claim the daily bonus
    Bonus,
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_target(false).compact())
        .init();

    tracing::debug!("{} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(Cli::parse()).await {
        match e.downcast_ref::<ApiError>() {
            Some(api_error) => {
                let info = ErrorInfo::from_error(Some(api_error));
                eprintln!("error: {}", info.content);
            }
            None => eprintln!("error: {:#}", e),
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = &*CONFIG;
    let store = Arc::new(
        FileTokenStore::open(&config.token_file)
            .with_context(|| format!("Failed to open token store {}", config.token_file.display()))?,
    );
    let api = IgameApi::from_config(config, store.clone())?;
    let mut session = Session::restore(store);

    match cli.command {
        Command::Login { email, password } => {
            let pair = api.login(&mut session, &email, &password).await?;
            println!("logged in as user {}", pair.user_id.or(session.user_id()).unwrap_or_default());
        }
        Command::Logout => {
            api.logout(&mut session)?;
            println!("logged out");
        }
        Command::Whoami => match api.current_user(&mut session).await? {
            Some(user) => {
                let now = Utc::now();
                println!("{} <{}>", user.nick_name, user.email);
                println!("level {} ({}/{} exp), {} coin", user.level(), user.exp, user.next_level_exp(), user.coin);
                if let Some(days) = user.vip_remaining_days(now) {
                    println!("vip for {} more days", days);
                }
                if user.claimed_daily_bonus_today(now) {
                    println!("daily bonus already claimed");
                }
            }
            None => println!("not logged in"),
        },
        Command::Apps { app_type, offset, limit, tags } => {
            let mut listing = AppListing::new(app_type);
            listing.offset = offset;
            listing.limit = limit;
            listing.tag_ids = tags;
            let (amount, apps) = futures::join!(api.app_amount(app_type), api.app_brief_infos(&listing));
            println!("{} {}s in total", amount?, app_type);
            for app in apps? {
                println!("{:>6}  {}  (level {}+)", app.id, app.name, app.required_level());
            }
        }
        Command::App { id } => {
            let lookup = AppLookup {
                id: Some(id),
                ..AppLookup::default()
            };
            let app = api.app_info(&lookup).await?;
            println!("{} [{}]", app.name, app.app_type);
            println!("{}", app.short_description);
            for resource in api.resource_brief_infos(app.id, 0, 50).await? {
                println!("{:>6}  {} {}", resource.id, resource.name, resource.version);
            }
        }
        Command::Download { resource_id, fast } => {
            let group = if fast { ProviderGroup::Fast } else { ProviderGroup::Normal };
            let url = api.resource_download_url(resource_id, group).await?;
            println!("{}", url.download_url);
            if let Some(coin) = url.remain_coin {
                println!("{} coin left", coin);
            }
        }
        Command::Notices { offset, limit } => {
            let notices = api.notice_infos(offset, limit).await?;
            let unread = api.unread_notices(&notices).len();
            println!("{} unread", unread);
            for notice in &notices {
                println!("{:>6}  {}", notice.notice_id, notice.title);
                api.mark_notice_read(notice.notice_id)?;
            }
        }
        Command::Bonus => {
            let bonus = api.daily_bonus().await?;
            println!(
                "day {} streak: +{} exp, +{} coin (now {} exp, {} coin)",
                bonus.count, bonus.added_exp, bonus.added_coin, bonus.total_exp, bonus.total_coin
            );
        }
    }

    Ok(())
}
