use clap::{Parser, ValueEnum};
use review_server::config::{DEFAULT_ADDRESS, DEFAULT_LOG_FILTER};
use review_server::{Server, ServerConfig};
use std::net::SocketAddr;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, ValueEnum)]
enum LogFormat {
    Pretty,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "review-server")]
struct Args {
    /// Address to listen on.
    #[arg(long, env = "REVIEW_SERVICE_ADDRESS", default_value = DEFAULT_ADDRESS)]
    address: SocketAddr,

    /// Log output format.
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,
}

fn init_tracing(format: &LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Pretty => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_tracing(&args.log_format);

    let config = ServerConfig { address: args.address };
    let (ready_tx, ready_rx) = tokio::sync::oneshot::channel();

    // Print "Listening on <addr>" once the server signals it is bound.
    tokio::spawn(async move {
        if let Ok(addr) = ready_rx.await {
            println!("Listening on {}", addr);
        }
    });

    Server::new(config).run(ready_tx).await?;
    Ok(())
}
