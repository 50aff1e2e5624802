use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEFAULT_DIRECTIVE: &str = "rankmerge=info";

/// Install the stderr subscriber.
///
/// `-v` raises the crate level to debug, `-q` lowers it to warn. Without either flag
/// `RUST_LOG` is honored and falls back to `rankmerge=info`.
pub fn setup_logging(verbose: u8, quiet: bool) {
    let filter = match (verbose, quiet) {
        (0, false) => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE)),
        (0, true) => EnvFilter::new("rankmerge=warn"),
        (1, _) => EnvFilter::new("rankmerge=debug"),
        _ => EnvFilter::new("rankmerge=trace"),
    };

    tracing_subscriber::registry()
        .with(
            fmt::Layer::new()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_filter(filter),
        )
        .init();
}
