use std::env;

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    init_tracing();

    let raw_args: Vec<String> = env::args().collect();
    if raw_args.get(1).map(|s| s.as_str()) == Some("serve") {
        let port = raw_args
            .get(2)
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(8080);
        if let Err(e) = loanpayoff::api::run_http_server(port).await {
            tracing::error!(error = %e, "server error");
            std::process::exit(1);
        }
        return;
    }

    match loanpayoff::api::run_cli(raw_args) {
        Ok(report) => println!("{report}"),
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}

// RUST_LOG wins; otherwise info. Logs go to stderr so the CLI report stays clean on stdout.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .init();
}
