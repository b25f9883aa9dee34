//! Request builder and response parser for the analysis service.
//!
//! # Design
//! `AnalysisClient` holds the resolved `RequestOptions` and the credential
//! scheme, and nothing else. Each operation is split into a `build_*` method
//! that produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`, so request construction stays deterministic and testable
//! without a network. `dispatch` wires the two halves to a `Transport`.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::auth::AuthScheme;
use crate::error::ClientError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::multipart::{MultipartForm, Snapshot};
use crate::options::RequestOptions;
use crate::types::{DeleteConfirmation, DeleteProject, ProjectStatus, SnapshotReceipt};

const JSON: &str = "application/json";

/// Client for one project on one analysis server.
#[derive(Debug, Clone)]
pub struct AnalysisClient {
    options: RequestOptions,
    auth: AuthScheme,
}

impl AnalysisClient {
    /// Options are validated per operation, so that failures surface through
    /// the operation's printer like every other error.
    pub fn new(options: RequestOptions) -> Self {
        Self {
            options,
            auth: AuthScheme::default(),
        }
    }

    pub fn with_auth_scheme(mut self, auth: AuthScheme) -> Self {
        self.auth = auth;
        self
    }

    pub fn options(&self) -> &RequestOptions {
        &self.options
    }

    pub fn auth_scheme(&self) -> &AuthScheme {
        &self.auth
    }

    /// Metadata fields first, then credential fields when the scheme puts
    /// them in the body, then the payload parts.
    pub fn build_post_snapshot(&self, snapshot: &Snapshot) -> Result<HttpRequest, ClientError> {
        let url = self.options.project_url(Some("snapshot"))?;
        if snapshot.parts.is_empty() {
            return Err(ClientError::Configuration(
                "snapshot has no payload parts".to_string(),
            ));
        }

        let opts = &self.options;
        let mut form = MultipartForm::new();
        for stack in &opts.stacks {
            form = form.text("stacks", stack);
        }
        if let Some(platform) = &opts.platform {
            form = form.text("platform", platform);
        }
        if let Some(profile) = &opts.profile {
            form = form.text("profile", profile);
        }
        form = form
            .text("android", bool_field(opts.android))
            .text("autoRepackaging", bool_field(opts.auto_repackaging));
        if let Some(credential) = &opts.credential {
            for (name, value) in self.auth.body_fields(credential) {
                form = form.text(name, value);
            }
        }
        for part in &snapshot.parts {
            form = form.part(&part.field, &part.file_name, &part.content_type, &part.data);
        }

        let request = HttpRequest::new(HttpMethod::Post, url)
            .with_header("accept", JSON)
            .with_form(form);
        Ok(self.authorize(request))
    }

    pub fn build_delete_project(&self) -> Result<HttpRequest, ClientError> {
        let url = self.options.project_url(None)?;
        let identity = DeleteProject {
            owner: self.options.resolved_owner(),
            project: self.options.project.trim(),
        };
        let mut body =
            serde_json::to_value(identity).map_err(|e| ClientError::Serialization(e.to_string()))?;
        if let (Some(credential), Value::Object(fields)) = (&self.options.credential, &mut body) {
            for (name, value) in self.auth.body_fields(credential) {
                fields.insert(name.to_string(), Value::String(value.to_string()));
            }
        }
        let body = serde_json::to_vec(&body).map_err(|e| ClientError::Serialization(e.to_string()))?;

        let request = HttpRequest::delete_with_body(url, JSON, body).with_header("accept", JSON);
        Ok(self.authorize(request))
    }

    pub fn build_project_status(&self) -> Result<HttpRequest, ClientError> {
        let url = self.options.project_url(Some("status"))?;
        let request = HttpRequest::new(HttpMethod::Get, url).with_header("accept", JSON);
        Ok(self.authorize(request))
    }

    pub fn parse_post_snapshot(&self, response: HttpResponse) -> Result<SnapshotReceipt, ClientError> {
        check_status(&response)?;
        decode(&response.body)
    }

    /// A bare 2xx with no body is a valid answer and yields `None`.
    pub fn parse_delete_project(
        &self,
        response: HttpResponse,
    ) -> Result<Option<DeleteConfirmation>, ClientError> {
        check_status(&response)?;
        if response.body.trim().is_empty() {
            return Ok(None);
        }
        decode(&response.body).map(Some)
    }

    pub fn parse_project_status(&self, response: HttpResponse) -> Result<ProjectStatus, ClientError> {
        check_status(&response)?;
        decode(&response.body)
    }

    /// Attach credential headers. Requests with a body may carry the
    /// credential in the payload instead, depending on the scheme.
    fn authorize(&self, mut request: HttpRequest) -> HttpRequest {
        if let Some(credential) = &self.options.credential {
            let has_body = request.body.is_some();
            for (name, value) in self.auth.headers(credential, has_body) {
                request = request.with_header(name, value);
            }
        }
        request
    }
}

fn bool_field(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

/// Map non-2xx status codes to `ServerRejected`.
fn check_status(response: &HttpResponse) -> Result<(), ClientError> {
    if response.is_success() {
        return Ok(());
    }
    Err(ClientError::ServerRejected {
        status: response.status,
        body: response.body.clone(),
    })
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ClientError> {
    serde_json::from_str(body).map_err(|e| ClientError::Deserialization(e.to_string()))
}
