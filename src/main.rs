use clap::{CommandFactory, Parser};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use sql_rps::{connect_postgres, Args, BenchConfig, BenchmarkRunner};

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let verbose = args.verbose;
    init_logging(verbose);

    let config = match BenchConfig::from_args(args) {
        Ok(config) => config,
        Err(e) => {
            println!("{}", e);
            println!();
            println!("{}", Args::command().render_help());
            return ExitCode::FAILURE;
        }
    };

    let pool = match connect_postgres(&config.dsn, config.request.workers).await {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let runner = BenchmarkRunner::new(Arc::new(pool.clone()));
    let stop = runner.stop_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupted, stopping workers");
            stop.stop();
        }
    });

    let result = runner.run(&config.request).await;
    pool.close().await;

    println!("{}", result);
    ExitCode::SUCCESS
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "sql_rps=debug,info"
    } else {
        "sql_rps=info,warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
