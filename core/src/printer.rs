//! Output sinks supplied by the caller.
//!
//! The client never writes to a terminal or logger on its own; every
//! operation takes a `&dyn Printer` and routes its diagnostics there.

use std::sync::{Mutex, PoisonError};

/// A printer of messages from the client, so that they can be fed to a
/// logger or written to the console.
///
/// `error` and `warn` are high-visibility. `debug` may be dropped depending
/// on the implementation's verbosity. `always` must be shown regardless of
/// verbosity.
pub trait Printer: Send + Sync {
    fn error(&self, message: &str);
    fn warn(&self, message: &str);
    fn debug(&self, message: &str);
    fn info(&self, message: &str);
    fn always(&self, message: &str);
}

/// Writes errors, warnings and debug output to stderr and everything else to
/// stdout. Debug output is dropped unless enabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsolePrinter {
    debug: bool,
}

impl ConsolePrinter {
    pub fn new(debug: bool) -> Self {
        Self { debug }
    }
}

impl Printer for ConsolePrinter {
    fn error(&self, message: &str) {
        eprintln!("{message}");
    }

    fn warn(&self, message: &str) {
        eprintln!("{message}");
    }

    fn debug(&self, message: &str) {
        if self.debug {
            eprintln!("{message}");
        }
    }

    fn info(&self, message: &str) {
        println!("{message}");
    }

    fn always(&self, message: &str) {
        println!("{message}");
    }
}

/// Forwards every sink to the matching `tracing` macro. Filtering is left to
/// the installed subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingPrinter;

impl Printer for TracingPrinter {
    fn error(&self, message: &str) {
        tracing::error!("{message}");
    }

    fn warn(&self, message: &str) {
        tracing::warn!("{message}");
    }

    fn debug(&self, message: &str) {
        tracing::debug!("{message}");
    }

    fn info(&self, message: &str) {
        tracing::info!("{message}");
    }

    fn always(&self, message: &str) {
        tracing::info!(always = true, "{message}");
    }
}

/// Which sink a [`MemoryPrinter`] line arrived through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrinterLevel {
    Error,
    Warn,
    Debug,
    Info,
    Always,
}

/// Records printed lines in order, for hosts that render output themselves.
#[derive(Debug, Default)]
pub struct MemoryPrinter {
    verbose: bool,
    lines: Mutex<Vec<(PrinterLevel, String)>>,
}

impl MemoryPrinter {
    pub fn new(verbose: bool) -> Self {
        Self {
            verbose,
            lines: Mutex::new(Vec::new()),
        }
    }

    /// Snapshot of everything recorded so far.
    pub fn lines(&self) -> Vec<(PrinterLevel, String)> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Recorded lines of one level.
    pub fn at(&self, level: PrinterLevel) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, text)| text)
            .collect()
    }

    fn record(&self, level: PrinterLevel, message: &str) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((level, message.to_string()));
    }
}

impl Printer for MemoryPrinter {
    fn error(&self, message: &str) {
        self.record(PrinterLevel::Error, message);
    }

    fn warn(&self, message: &str) {
        self.record(PrinterLevel::Warn, message);
    }

    fn debug(&self, message: &str) {
        if self.verbose {
            self.record(PrinterLevel::Debug, message);
        }
    }

    fn info(&self, message: &str) {
        self.record(PrinterLevel::Info, message);
    }

    fn always(&self, message: &str) {
        self.record(PrinterLevel::Always, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_printer_records_every_sink_in_order() {
        let printer = MemoryPrinter::new(true);
        printer.error("e");
        printer.warn("w");
        printer.debug("d");
        printer.info("i");
        printer.always("a");
        let levels: Vec<_> = printer.lines().into_iter().map(|(l, _)| l).collect();
        assert_eq!(
            levels,
            vec![
                PrinterLevel::Error,
                PrinterLevel::Warn,
                PrinterLevel::Debug,
                PrinterLevel::Info,
                PrinterLevel::Always
            ]
        );
    }

    #[test]
    fn memory_printer_gates_debug_only() {
        let printer = MemoryPrinter::new(false);
        printer.debug("hidden");
        printer.always("shown");
        printer.error("boom");
        assert!(printer.at(PrinterLevel::Debug).is_empty());
        assert_eq!(printer.at(PrinterLevel::Always), vec!["shown"]);
        assert_eq!(printer.at(PrinterLevel::Error), vec!["boom"]);
    }

    #[test]
    fn printers_are_usable_as_trait_objects() {
        let printers: Vec<Box<dyn Printer>> = vec![
            Box::new(ConsolePrinter::new(false)),
            Box::new(TracingPrinter),
            Box::new(MemoryPrinter::new(false)),
        ];
        for printer in &printers {
            printer.debug("quiet");
        }
    }
}
