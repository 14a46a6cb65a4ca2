//! The process-wide sink to which statistics are written as `{prefix} {name}={value}` lines.

use std::fmt::Display;
use std::io::stdout;
use std::io::Write;
use std::sync::Mutex;
use std::sync::OnceLock;

use convert_case::Case;
use convert_case::Casing;

struct StatisticSink {
    prefix: &'static str,
    closing_line: Option<&'static str>,
    casing: Option<Case>,
    writer: Box<dyn Write + Send>,
}

impl StatisticSink {
    fn write_line(&mut self, line: impl Display) {
        let _ = writeln!(self.writer, "{line}");
    }
}

static SINK: OnceLock<Mutex<StatisticSink>> = OnceLock::new();

fn with_sink(action: impl FnOnce(&mut StatisticSink)) {
    if let Some(Ok(mut sink)) = SINK.get().map(Mutex::lock) {
        action(&mut sink);
    }
}

/// Enables statistic logging. Every statistic line starts with `prefix`; `closing_line` is
/// written by [`log_statistic_postfix`] after a batch of statistics. Names are re-cased with
/// `casing` when given, and lines go to `writer` (stdout by default).
///
/// Statistics logged before this is called are dropped. Only the first configuration is kept.
pub fn configure_statistic_logging(
    prefix: &'static str,
    closing_line: Option<&'static str>,
    casing: Option<Case>,
    writer: Option<Box<dyn Write + Send>>,
) {
    let _ = SINK.get_or_init(|| {
        Mutex::new(StatisticSink {
            prefix,
            closing_line,
            casing,
            writer: writer.unwrap_or_else(|| Box::new(stdout())),
        })
    });
}

pub fn log_statistic(name: impl Display, value: impl Display) {
    with_sink(|sink| {
        let name = match sink.casing {
            Some(casing) => name.to_string().to_case(casing),
            None => name.to_string(),
        };
        let prefix = sink.prefix;
        sink.write_line(format_args!("{prefix} {name}={value}"));
    });
}

/// Closes a batch of statistics with the configured closing line, if any.
pub fn log_statistic_postfix() {
    with_sink(|sink| {
        if let Some(closing_line) = sink.closing_line {
            sink.write_line(closing_line);
        }
    });
}
