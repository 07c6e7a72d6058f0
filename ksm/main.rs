use anyhow::Result;
use app::App;
use clap::Parser;
use ksm_config::{APP_NAME, APP_VERSION};
use tokio::runtime::Builder;
use tracing::{error, info};

mod app;
mod cli;
mod handler;
mod server;

fn main() -> Result<()> {
    let args = cli::Args::parse();

    let _logging_guard = ksm_common::logging::initialize(APP_NAME, &args.log_level, args.log_format)?;
    info!("{} v{} started", APP_NAME, APP_VERSION);

    if let Err(error) = run_application(&args) {
        error!("{} v{} terminated with an error: {}", APP_NAME, APP_VERSION, error);
        Err(error)
    } else {
        info!("{} v{} stopped", APP_NAME, APP_VERSION);
        Ok(())
    }
}

fn run_application(args: &cli::Args) -> Result<()> {
    let rt = Builder::new_multi_thread().enable_all().build()?;

    let mut app = App::new(rt.handle().clone(), args.to_options(), args.namespaces_label_selector.clone())?;
    rt.spawn(app::shutdown_signal(app.cancellation_token()));

    rt.block_on(app.run())
}
