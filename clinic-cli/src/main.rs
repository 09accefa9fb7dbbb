//! 诊所客户端命令行程序

mod cli;
mod commands;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Args, Command};
use clinic_client::{ApiClient, ClinicApi, Navigator};
use clinic_config::{init_logging, ClinicConfig, LoggingConfig};
use clinic_session::{FileStorage, SessionStore};
use clinic_views::AppContext;
use std::sync::Arc;
use tracing::{debug, error};

/// 凭证失效时提示用户重新登录
struct CliNavigator;

impl Navigator for CliNavigator {
    fn redirect_to_login(&self) {
        eprintln!("Your session has expired. Sign in again with `clinic login`.");
    }
}

fn build_context(config: &ClinicConfig) -> Result<AppContext> {
    let storage = Arc::new(FileStorage::new(&config.session.storage_path));
    let session = SessionStore::with_key(storage, config.session.storage_key.clone());

    let client = ApiClient::builder(config.api.base_url.clone(), session)
        .timeout(config.api.timeout())
        .navigator(Arc::new(CliNavigator))
        .build()
        .context("Failed to create API client")?;

    Ok(AppContext::new(ClinicApi::new(client)))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let command = match args.command {
        Command::Config { action } => {
            init_logging(&LoggingConfig::default(), args.log_level.as_deref())?;
            return commands::init_config(action).await;
        }
        command => command,
    };

    let config = ClinicConfig::load(args.config.as_deref())?;
    init_logging(&config.logging, args.log_level.as_deref())?;
    debug!("Using backend {}", config.api.base_url);

    let ctx = build_context(&config)?;
    if let Err(e) = commands::run(command, &ctx, &config).await {
        error!("Command failed: {}", e);
        return Err(e);
    }

    Ok(())
}
