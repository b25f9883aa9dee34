//! DTOs exchanged with the analysis service.
//!
//! # Design
//! These mirror the mock server's schema but are defined independently, so
//! integration tests catch drift between the two crates.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Answer to a snapshot upload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotReceipt {
    pub id: Uuid,
    #[serde(default)]
    pub owner: Option<String>,
    pub project: String,
    /// Number of binary parts the server accepted.
    pub parts: usize,
    #[serde(default)]
    pub stacks: Vec<String>,
}

/// Current state of a project on the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectStatus {
    #[serde(default)]
    pub owner: Option<String>,
    pub project: String,
    pub snapshots: u32,
    #[serde(default)]
    pub stacks: Vec<String>,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub android: bool,
    #[serde(default)]
    pub auto_repackaging: bool,
}

/// Optional JSON confirmation of a project deletion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeleteConfirmation {
    pub project: String,
    pub deleted: bool,
}

/// JSON body of the delete-project request. Credential fields are added
/// next to these when the server reads them from the payload.
#[derive(Debug, Serialize)]
pub(crate) struct DeleteProject<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<&'a str>,
    pub project: &'a str,
}
