use clap::Parser;
use ora2pg_cli::{run, Args, ExitCode};
use tracing_subscriber::{filter::LevelFilter, EnvFilter};

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .compact()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting tracing default failed");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("failed to start runtime");

    let result = runtime.block_on(run(args));
    runtime.shutdown_background();

    match result {
        Ok(ExitCode::Success) => Ok(()),
        Ok(code) => std::process::exit(code as i32),
        Err(err) => {
            tracing::error!(%err, "migration failed");
            std::process::exit(70);
        }
    }
}
