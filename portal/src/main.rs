//! Portal entry-point: parses the command line, wires adapters and runs one
//! operation or the edge server.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

mod cli;
mod server;

use std::ffi::OsString;
use std::process::ExitCode;

use actix_web::web;
use clap::Parser;
use color_eyre::eyre::WrapErr;
use ortho_config::OrthoConfig;
use tracing::{error, warn};
use tracing_subscriber::{EnvFilter, fmt};

use cli::{Cli, Command, Portal};
use portal::PortalSettings;
use portal::inbound::http::HealthState;
use server::{ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> color_eyre::Result<ExitCode> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let args = Cli::parse();
    // Global flags are parsed by clap above and layered on afterwards.
    let mut settings = PortalSettings::load_from_iter([OsString::from("portal")])
        .wrap_err("load portal settings")?;
    args.apply_overrides(&mut settings);

    if matches!(args.command, Command::Serve) {
        let config = ServerConfig::from_settings(&settings).wrap_err("resolve server settings")?;
        let health_state = web::Data::new(HealthState::new());
        create_server(health_state, config)
            .wrap_err("start edge server")?
            .await
            .wrap_err("run edge server")?;
        return Ok(ExitCode::SUCCESS);
    }

    let portal = Portal::build(settings, args.fixture)?;
    match portal.run(args.command).await {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(err) => {
            error!(code = ?err.code(), error = %err, "command failed");
            eprintln!("error: {err}");
            Ok(ExitCode::FAILURE)
        }
    }
}
