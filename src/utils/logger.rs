use tracing::Subscriber;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn filter(verbose: bool) -> EnvFilter {
    let default_directive = if verbose {
        "product_content_etl=debug,info"
    } else {
        "product_content_etl=info"
    };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive))
}

fn cli_subscriber(verbose: bool) -> impl Subscriber + Send + Sync + 'static {
    tracing_subscriber::registry().with(filter(verbose)).with(
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .compact(),
    )
}

/// JSON lines for runs driven by a job file, so logs can be shipped as-is.
fn json_subscriber(verbose: bool) -> impl Subscriber + Send + Sync + 'static {
    tracing_subscriber::registry().with(filter(verbose)).with(
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .json()
            .with_current_span(false),
    )
}

pub fn init_cli_logger(verbose: bool) {
    cli_subscriber(verbose).init();
}

pub fn init_json_logger(verbose: bool) {
    json_subscriber(verbose).init();
}
