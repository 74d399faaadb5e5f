use colored::*;
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::Write as IoWrite;
use std::path::Path;
use std::sync::Mutex;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::{FormatEvent, FormatFields, Writer};
use tracing_subscriber::fmt::FmtContext;
use tracing_subscriber::registry::LookupSpan;

/// A custom tracing event formatter for colorizing log output based on level.
///
/// This formatter is designed to provide clean, user-facing output where the
/// entire log line is colored according to its severity level, without any
/// extra metadata like timestamps or log levels printed.
pub struct ColorizedFormatter;

impl<S, N> FormatEvent<S, N> for ColorizedFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        // Buffer the formatted fields to apply color to the entire line.
        let mut buffer = String::new();
        let mut buf_writer = Writer::new(&mut buffer);
        ctx.format_fields(buf_writer.by_ref(), event)?;

        let colored_output = match *event.metadata().level() {
            Level::INFO => buffer.white(),
            Level::WARN => buffer.yellow(),
            Level::ERROR => buffer.red(),
            Level::DEBUG => buffer.blue(),
            Level::TRACE => buffer.purple(),
        };

        writeln!(writer, "{}", colored_output)
    }
}

/// Destination for session lifecycle events and rate reports.
///
/// The server and client cores call `log` for every line a user cares about;
/// what happens to the line (file, console, test capture) is the sink's
/// business. Implementations must serialize writes internally.
pub trait LogSink: Send + Sync {
    fn log(&self, line: &str);

    /// Push buffered lines to durable storage. Called at session boundaries.
    fn flush(&self) {}
}

/// Production sink: timestamped lines appended to a log file and echoed to
/// the console.
pub struct FileConsoleSink {
    file: Mutex<File>,
}

impl FileConsoleSink {
    pub fn open(path: &Path) -> std::io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }

    fn stamp() -> String {
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f").to_string()
    }
}

impl LogSink for FileConsoleSink {
    fn log(&self, line: &str) {
        let stamped = format!("{} {}", Self::stamp(), line);
        println!("{}", stamped);
        if let Ok(mut file) = self.file.lock() {
            // A failed write to the log file must not abort a transfer.
            let _ = writeln!(file, "{}", stamped);
        }
    }

    fn flush(&self) {
        if let Ok(mut file) = self.file.lock() {
            let _ = file.flush();
        }
    }
}
