//! Logger builder implementation

use tracing_subscriber::{EnvFilter, Layer, Registry, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{Config, Format, LogError, LogResult};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

/// Applies the shared display options and picks the writer for a fmt layer.
/// Each format yields a distinct layer type, so the result is boxed.
macro_rules! boxed_fmt_layer {
    ($layer:expr, $config:expr) => {{
        let layer = $layer.with_ansi($config.ansi).with_target($config.target);
        if $config.test_writer {
            Box::new(layer.with_test_writer()) as BoxedLayer
        } else {
            Box::new(layer.with_writer(std::io::stderr)) as BoxedLayer
        }
    }};
}

/// Logger builder
#[derive(Debug)]
pub struct LoggerBuilder {
    config: Config,
}

impl LoggerBuilder {
    /// Create builder from config
    #[must_use]
    pub fn from_config(config: Config) -> Self {
        Self { config }
    }

    /// Parses the filter and builds the format layer without installing it
    pub(crate) fn layers(&self) -> LogResult<(EnvFilter, BoxedLayer)> {
        let filter = EnvFilter::try_new(&self.config.level)
            .map_err(|e| LogError::Filter(format!("{}: {}", &self.config.level, e)))?;

        let fmt = tracing_subscriber::fmt::layer();
        let fmt_layer = match self.config.format {
            Format::Pretty => boxed_fmt_layer!(fmt.pretty(), self.config),
            Format::Compact => boxed_fmt_layer!(fmt.compact(), self.config),
            Format::Json => boxed_fmt_layer!(fmt.json(), self.config),
        };

        Ok((filter, fmt_layer))
    }

    /// Build and install the global subscriber
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Filter string cannot be parsed
    /// - A global subscriber is already installed
    pub fn build(self) -> LogResult<()> {
        let (filter, fmt_layer) = self.layers()?;

        Registry::default()
            .with(fmt_layer)
            .with(filter)
            .try_init()
            .map_err(|e| LogError::Init(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_filter() {
        let builder = LoggerBuilder::from_config(Config::default().with_level("trial=[bad"));
        assert!(matches!(builder.layers(), Err(LogError::Filter(_))));
    }

    #[test]
    fn every_format_builds() {
        for format in [Format::Pretty, Format::Compact, Format::Json] {
            let builder = LoggerBuilder::from_config(Config::test().with_format(format));
            assert!(builder.layers().is_ok(), "{format:?} should build");
        }
    }
}
