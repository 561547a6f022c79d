// src/main.rs

use livebuild::errors::Reported;
use livebuild::{cli, logging, run};

#[tokio::main]
async fn main() {
    if let Err(err) = run_main().await {
        if err.downcast_ref::<Reported>().is_none() {
            eprintln!("livebuild error: {err:?}");
        }
        std::process::exit(1);
    }
}

async fn run_main() -> anyhow::Result<()> {
    let args = cli::parse();
    logging::init_logging(args.log_level)?;
    run(args).await
}
