// src/main.rs

use taskrun::errors::TaskrunError;
use taskrun::{cli, logging, run};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(err) = run_main().await {
        eprintln!("taskrun error: {err}");
        let code = match &err {
            TaskrunError::TaskExecution { exit_code, .. } if (1..=255).contains(exit_code) => *exit_code,
            _ => 1,
        };
        std::process::exit(code);
    }
}

async fn run_main() -> taskrun::errors::Result<()> {
    let args = cli::parse();
    logging::init_logging(args.log_level)?;
    run(args).await
}
