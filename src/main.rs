#![allow(clippy::doc_markdown)]
#![doc = include_str!("../README.md")]

mod api;
mod cache;
mod cli;
mod config;
mod core;
mod prelude;
mod quantity;
mod tables;

use clap::{Parser, crate_version};

use crate::{
    cli::{Args, Command},
    prelude::*,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().without_time().compact().init();
    info!(version = crate_version!(), "starting…");

    match Args::parse().command {
        Command::Plan(args) => cli::plan(&args).await?,
        Command::Forecast(args) => cli::forecast(&args).await?,
    }

    info!("done!");
    Ok(())
}
