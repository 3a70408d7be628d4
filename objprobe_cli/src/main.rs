mod ui;

use crate::ui::cli;
use clap::Parser;
use objprobe_core::utils::logging::init_logging;

#[cfg(not(feature = "s3"))]
compile_error!("objprobe needs the `s3` feature for its storage client");

#[tokio::main]
async fn main() {
    let args = cli::Args::parse();
    init_logging(args.log_level);
    if let Err(e) = cli::run_cli(args).await {
        eprintln!("objprobe: {e}");
        std::process::exit(1);
    }
}
