use tracing_subscriber::EnvFilter;

use lagwatch_exporter::{cli, config, run};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .json()
        .init();

    let args = cli::parse();

    // Invalid configuration is the only fatal error; fail before any loop
    // starts.
    let cfg = match config::load_from_file(&args.config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!(path = %args.config_path.display(), error = %e, "invalid configuration");
            std::process::exit(1);
        }
    };

    if let Err(e) = run::run(cfg, args.config_path).await {
        tracing::error!(error = %e, "exporter exited with error");
        std::process::exit(1);
    }
}
