use crate::layer::LoggerLayer;
use crate::level::Level;
use crate::logger::Logger;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

/// Configuration of the tracing bridge.
///
/// **Fields**
/// - `min_level`: events below this severity are not forwarded.
/// - `enable_stderr`: if `true`, a human-readable `fmt` layer writing to
///   stderr is installed next to [`LoggerLayer`].
#[derive(Clone, Debug)]
pub struct LayerConfig {
    pub min_level: Level,
    pub enable_stderr: bool,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            min_level: Level::Info,
            enable_stderr: false,
        }
    }
}

/// Error returned when the global subscriber cannot be installed.
#[derive(thiserror::Error, Debug)]
pub enum InitError {
    #[error("a global tracing subscriber is already installed: {0}")]
    AlreadyInstalled(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Install [`LoggerLayer`] as the global `tracing` subscriber.
///
/// **Parameters**
/// - `logger`: receives every forwarded event as a record.
/// - `config`: [`LayerConfig`] controlling the threshold and the optional
///   stderr layer.
///
/// **Returns**
/// - `Err(InitError::AlreadyInstalled)` if a global subscriber was set
///   before.
pub fn init_tracing_with_config(logger: Logger, config: LayerConfig) -> Result<(), InitError> {
    let layer = LoggerLayer::new(logger, config.min_level);
    let fmt_layer = config
        .enable_stderr
        .then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    let subscriber = Registry::default().with(layer).with(fmt_layer);
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// Equivalent to [`init_tracing_with_config`] with
/// [`LayerConfig::default`].
pub fn init_tracing(logger: Logger) -> Result<(), InitError> {
    init_tracing_with_config(logger, LayerConfig::default())
}
