use anyhow::Result;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::{Registry, prelude::*};

/// Initialize the tracing subscriber. `logging_mode` doubles as the env
/// filter directive and the output selector: `json` and `pretty` switch the
/// formatter, anything else is compact.
pub fn init(logging_mode: &str) -> Result<()> {
    let directives = if logging_mode.is_empty() { "info" } else { logging_mode };
    let filter = EnvFilter::try_new(directives).unwrap_or_else(|_| EnvFilter::new("info"));

    // Logging modes (boxed trait objects so types unify)
    let fmt_layer: Box<dyn tracing_subscriber::Layer<_> + Send + Sync> = {
        match logging_mode {
            "json" => Box::new(
                fmt::layer()
                    .json()
                    .with_thread_ids(true)
                    .with_thread_names(true)
                    .with_filter(filter),
            ),
            "pretty" => Box::new(fmt::layer().pretty().with_filter(filter)),
            _ => Box::new(fmt::layer().with_filter(filter)),
        }
    };

    let subscriber = Registry::default().with(fmt_layer);
    tracing::subscriber::set_global_default(subscriber)?;

    Ok(())
}
