//! Coupon Codes CLI - browse the public catalog and run the admin dashboard.
//!
//! # Usage
//!
//! ```bash
//! # Browse approved coupons, optionally filtered
//! coupons browse --search noon --category Fashion --locale ar
//!
//! # Show or change the saved display language
//! coupons locale show
//! coupons locale toggle
//!
//! # Admin dashboard (signs in with COUPONS_ADMIN_EMAIL / COUPONS_ADMIN_PASSWORD)
//! coupons admin list
//! coupons admin approve Xq3bT9
//! coupons admin order Xq3bT9 2
//! coupons admin categories add --name-en Food --name-ar طعام
//! ```
//!
//! # Commands
//!
//! - `browse` - List approved coupons
//! - `locale` - Saved display language
//! - `admin` - Approve, order and delete coupons; manage categories
//! - `submit` - Submit a coupon for approval

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::io::Write;

use clap::{Args, Parser, Subcommand};
use coupon_codes_catalog::{CatalogConfig, PreferenceStore};
use coupon_codes_core::Locale;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "coupons")]
#[command(author, version, about = "Coupon Codes catalog tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List approved coupons
    Browse {
        /// Keep coupons whose title contains this text (case-insensitive)
        #[arg(short, long)]
        search: Option<String>,

        /// Keep coupons in this category (display name in the chosen language)
        #[arg(short, long)]
        category: Option<String>,

        /// Display language (defaults to the saved preference)
        #[arg(short, long)]
        locale: Option<Locale>,
    },
    /// Show or change the saved display language
    Locale {
        #[command(subcommand)]
        action: LocaleAction,
    },
    /// Submit a coupon for approval
    Submit(CouponArgs),
    /// Admin dashboard
    Admin {
        /// Admin email address
        #[arg(short, long, env = "COUPONS_ADMIN_EMAIL")]
        email: Option<String>,

        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum LocaleAction {
    /// Print the saved language
    Show,
    /// Save a language (`en` or `ar`)
    Set { locale: Locale },
    /// Switch between English and Arabic
    Toggle,
}

#[derive(Subcommand)]
enum AdminAction {
    /// List approved coupons by display order, then pending coupons
    List,
    /// Publish a coupon
    Approve { id: String },
    /// Hide a coupon from the public catalog
    Disapprove { id: String },
    /// Set a coupon's display order
    Order {
        id: String,
        /// Whole number; smaller values are shown first
        #[arg(allow_hyphen_values = true)]
        value: String,
    },
    /// Permanently delete a coupon
    Delete { id: String },
    /// Add a coupon (it starts pending)
    AddCoupon(CouponArgs),
    /// Manage categories
    Categories {
        #[command(subcommand)]
        action: CategoryAction,
    },
}

#[derive(Subcommand)]
enum CategoryAction {
    /// List categories
    List,
    /// Add a category
    Add {
        #[arg(long)]
        name_en: String,
        #[arg(long)]
        name_ar: String,
    },
    /// Delete a category (coupons keep their labels)
    Delete { id: String },
}

/// Fields of a new coupon.
#[derive(Args)]
struct CouponArgs {
    #[arg(long)]
    title_en: String,
    #[arg(long)]
    title_ar: String,
    /// Discount description in English, e.g. "20% off"
    #[arg(long)]
    value_en: String,
    #[arg(long)]
    value_ar: String,
    /// The code shoppers redeem
    #[arg(long)]
    code: String,
    #[arg(long)]
    logo_url: String,
    /// Take both category labels from an existing category
    #[arg(long, conflicts_with_all = ["category_en", "category_ar"])]
    category_id: Option<String>,
    #[arg(long, requires = "category_ar")]
    category_en: Option<String>,
    #[arg(long, requires = "category_en")]
    category_ar: Option<String>,
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    // Defaults to info level for our crates if RUST_LOG is not set.
    // Logs go to stderr so command output stays pipeable.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "coupon_codes=info".into());
    let json = std::env::var("COUPONS_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    let json_layer = json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_writer(std::io::stderr)
    });
    let text_layer =
        (!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!(error = %e, "Command failed");
        let _ = writeln!(std::io::stderr(), "{}", e.user_message());
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CliError> {
    match cli.command {
        // The language preference needs no backend settings.
        Commands::Locale { action } => {
            let preferences = PreferenceStore::new(CatalogConfig::preferences_path_from_env());
            match action {
                LocaleAction::Show => commands::locale::show(&preferences).await,
                LocaleAction::Set { locale } => commands::locale::set(&preferences, locale).await,
                LocaleAction::Toggle => commands::locale::toggle(&preferences).await,
            }
        }
        Commands::Browse {
            search,
            category,
            locale,
        } => {
            let config = CatalogConfig::from_env()?;
            commands::browse::run(&config, search, category, locale).await
        }
        Commands::Submit(args) => {
            let config = CatalogConfig::from_env()?;
            commands::browse::submit(&config, args.into_input()).await
        }
        Commands::Admin { email, action } => {
            let config = CatalogConfig::from_env()?;
            let dashboard = commands::admin::Dashboard::open(&config, email.as_deref()).await?;
            let result = match action {
                AdminAction::List => dashboard.list(),
                AdminAction::Approve { id } => dashboard.set_approval(&id, true).await,
                AdminAction::Disapprove { id } => dashboard.set_approval(&id, false).await,
                AdminAction::Order { id, value } => dashboard.set_order(&id, &value).await,
                AdminAction::Delete { id } => dashboard.delete_coupon(&id).await,
                AdminAction::AddCoupon(args) => dashboard.add_coupon(args.into_input()).await,
                AdminAction::Categories { action } => match action {
                    CategoryAction::List => dashboard.list_categories(),
                    CategoryAction::Add { name_en, name_ar } => {
                        dashboard.add_category(&name_en, &name_ar).await
                    }
                    CategoryAction::Delete { id } => dashboard.delete_category(&id).await,
                },
            };
            dashboard.close().await;
            result
        }
    }
}

impl CouponArgs {
    fn into_input(self) -> commands::CouponInput {
        commands::CouponInput {
            title_en: self.title_en,
            title_ar: self.title_ar,
            value_en: self.value_en,
            value_ar: self.value_ar,
            code: self.code,
            logo_url: self.logo_url,
            category: match (self.category_id, self.category_en, self.category_ar) {
                (Some(id), _, _) => commands::CategoryChoice::Existing(id),
                (None, en, ar) => commands::CategoryChoice::Labels {
                    en: en.unwrap_or_default(),
                    ar: ar.unwrap_or_default(),
                },
            },
        }
    }
}
