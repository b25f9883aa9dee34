//! Running client operations over a `Transport`.
//!
//! Each operation builds its request, logs what it is about to do, executes
//! it unless the options ask for a dry run, and parses the answer. Messages
//! are collected in a `MessageLog` and drained into the caller's printer once
//! the operation finishes. A failure adds exactly one `error` line after them.

use crate::client::AnalysisClient;
use crate::error::ClientError;
use crate::http::{HttpRequest, HttpResponse};
use crate::message::MessageLog;
use crate::multipart::Snapshot;
use crate::printer::Printer;
use crate::session::Transport;
use crate::types::{DeleteConfirmation, ProjectStatus, SnapshotReceipt};

/// Result of an operation that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    /// The request was sent and the answer parsed.
    Sent(T),
    /// Dry run: the request was built and validated but not sent.
    DryRun(HttpRequest),
}

impl<T> Outcome<T> {
    pub fn is_dry_run(&self) -> bool {
        matches!(self, Outcome::DryRun(_))
    }

    pub fn sent(&self) -> Option<&T> {
        match self {
            Outcome::Sent(value) => Some(value),
            Outcome::DryRun(_) => None,
        }
    }

    pub fn into_sent(self) -> Option<T> {
        match self {
            Outcome::Sent(value) => Some(value),
            Outcome::DryRun(_) => None,
        }
    }
}

type Parser<T> = fn(&AnalysisClient, HttpResponse) -> Result<T, ClientError>;

impl AnalysisClient {
    /// Upload a snapshot of the project's code artifacts.
    pub fn post_snapshot(
        &self,
        transport: &dyn Transport,
        snapshot: &Snapshot,
        printer: &dyn Printer,
    ) -> Result<Outcome<SnapshotReceipt>, ClientError> {
        let request = self.build_post_snapshot(snapshot);
        self.dispatch(transport, printer, request, AnalysisClient::parse_post_snapshot)
    }

    /// Delete the project on the server.
    pub fn delete_project(
        &self,
        transport: &dyn Transport,
        printer: &dyn Printer,
    ) -> Result<Outcome<Option<DeleteConfirmation>>, ClientError> {
        let request = self.build_delete_project();
        self.dispatch(transport, printer, request, AnalysisClient::parse_delete_project)
    }

    /// Fetch the project's status and results summary.
    pub fn project_status(
        &self,
        transport: &dyn Transport,
        printer: &dyn Printer,
    ) -> Result<Outcome<ProjectStatus>, ClientError> {
        let request = self.build_project_status();
        self.dispatch(transport, printer, request, AnalysisClient::parse_project_status)
    }

    fn dispatch<T>(
        &self,
        transport: &dyn Transport,
        printer: &dyn Printer,
        request: Result<HttpRequest, ClientError>,
        parse: Parser<T>,
    ) -> Result<Outcome<T>, ClientError> {
        let mut log = MessageLog::new();
        let result = self.run(transport, &mut log, request, parse);
        log.drain_to(printer);
        if let Err(e) = &result {
            printer.error(&e.to_string());
        }
        result
    }

    fn run<T>(
        &self,
        transport: &dyn Transport,
        log: &mut MessageLog,
        request: Result<HttpRequest, ClientError>,
        parse: Parser<T>,
    ) -> Result<Outcome<T>, ClientError> {
        let request = request?;

        if self.options().dry_run {
            log.debug(format!(
                "dry run, not sending {} {} (project {}, {} body bytes)",
                request.method,
                request.url,
                self.options().project.trim(),
                request.body_len()
            ));
            return Ok(Outcome::DryRun(request));
        }

        log.debug(format!("{} {}", request.method, request.url));
        let response = transport.execute(&request)?;
        log.debug(format!("server answered HTTP {}", response.status));
        parse(self, response).map(Outcome::Sent)
    }
}
