// src/main.rs

use fab::config::BuildConfig;
use fab::{cli, logging, run};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(err) = run_main().await {
        eprintln!("fab: error: {err}");
        std::process::exit(1);
    }
}

async fn run_main() -> anyhow::Result<()> {
    let args = cli::parse();
    logging::init_logging(args.log_level)?;
    let config = BuildConfig::from_args(&args)?;
    run(&config).await?;
    Ok(())
}
