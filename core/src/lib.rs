//! Client for submitting code snapshots to a remote analysis service.
//!
//! # Overview
//! Resolves connection, credential and project options into HTTP requests,
//! executes them over an explicitly owned `Session`, and reports diagnostics
//! through a caller-supplied `Printer`. The library never writes to the
//! console or a global logger on its own.
//!
//! # Design
//! - `AnalysisClient` splits every operation into `build_*` (produces an
//!   `HttpRequest`) and `parse_*` (consumes an `HttpResponse`); the
//!   `post_snapshot` / `delete_project` / `project_status` methods join them
//!   over any `Transport`.
//! - `Session` is the real transport: one reqwest client with a one-hour
//!   socket timeout, explicitly closed by its owner. Closing aborts requests
//!   still in flight.
//! - The delete-project endpoint takes a JSON body on `DELETE`; requests are
//!   plain data, so any method may carry raw bytes or a multipart form.
//! - Dry runs build and validate requests without touching the transport.

pub mod auth;
pub mod client;
pub mod dispatch;
pub mod error;
pub mod http;
pub mod message;
pub mod multipart;
pub mod options;
pub mod printer;
pub mod session;
pub mod types;

pub use auth::{AuthScheme, Credential};
pub use client::AnalysisClient;
pub use dispatch::Outcome;
pub use error::ClientError;
pub use http::{HttpMethod, HttpRequest, HttpResponse, RequestBody};
pub use message::{Message, MessageKind, MessageLog};
pub use multipart::{FormField, FormValue, MultipartForm, Snapshot, SnapshotPart};
pub use options::{RequestOptions, Scheme};
pub use printer::{ConsolePrinter, MemoryPrinter, Printer, PrinterLevel, TracingPrinter};
pub use session::{Session, SessionConfig, Transport};
pub use types::{DeleteConfirmation, ProjectStatus, SnapshotReceipt};
