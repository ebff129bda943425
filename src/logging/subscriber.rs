//! Tracing subscriber setup: console formatter and initialisation.
use super::logger::STAGE_TARGET;

/// Extracts the `message` and `machine` fields from a [`tracing::Event`].
#[derive(Default)]
struct FieldExtractor {
    message: String,
    machine: Option<String>,
}

impl tracing::field::Visit for FieldExtractor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        match field.name() {
            "message" => self.message = format!("{value:?}"),
            "machine" => self.machine = Some(format!("{value:?}")),
            _ => {}
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        match field.name() {
            "message" => self.message = value.to_string(),
            "machine" => self.machine = Some(value.to_string()),
            _ => {}
        }
    }
}

/// A [`tracing_subscriber::fmt::FormatEvent`] that prefixes each line with
/// the machine it concerns, in the `* <machine>: ...` style.
struct ProvisionFormatter;

impl<S, N> tracing_subscriber::fmt::FormatEvent<S, N> for ProvisionFormatter
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    N: for<'a> tracing_subscriber::fmt::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: tracing_subscriber::fmt::format::Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let metadata = event.metadata();
        let level = *metadata.level();

        let mut extractor = FieldExtractor::default();
        event.record(&mut extractor);
        let msg = &extractor.message;
        let prefix = extractor
            .machine
            .map_or_else(String::new, |m| format!("* {m}: "));

        match level {
            tracing::Level::ERROR => writeln!(writer, "{prefix}\x1b[31m[Error]\x1b[0m {msg}"),
            tracing::Level::WARN => writeln!(writer, "{prefix}\x1b[33m[Warning]\x1b[0m {msg}"),
            tracing::Level::INFO if metadata.target() == STAGE_TARGET => {
                writeln!(writer, "\x1b[1;34m==>\x1b[0m {prefix}\x1b[1m{msg}\x1b[0m")
            }
            tracing::Level::INFO => writeln!(writer, "{prefix}{msg}"),
            _ => writeln!(writer, "\x1b[2m{prefix}{msg}\x1b[0m"),
        }
    }
}

/// Initialise the global [`tracing`] subscriber.
///
/// All console output goes to stderr so that a rendered script written to
/// stdout stays clean.  `RUST_LOG` overrides the level chosen by `verbose`.
/// Must be called once at program startup, before any logging.
pub fn init_subscriber(verbose: bool) {
    use tracing_subscriber::{
        EnvFilter, Layer as _, fmt, layer::SubscriberExt as _, util::SubscriberInitExt as _,
    };

    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let console_layer = fmt::layer()
        .event_format(ProvisionFormatter)
        .with_writer(std::io::stderr)
        .with_filter(filter);

    tracing_subscriber::registry().with(console_layer).init();
}
