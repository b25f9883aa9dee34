//! Connection, project and feature options for one interaction with the
//! analysis service.
//!
//! # Design
//! Servers have been addressed both as `host` + `port` (+ base path) and as a
//! single prefix such as `www.service.com:8080/abc`. Both forms resolve into
//! the same `RequestOptions`, so the rest of the crate only ever sees one
//! shape. Options are validated where they are used, not when they are
//! decoded, so a partially filled configuration can still be inspected.

use serde::Deserialize;
use url::Url;

use crate::auth::Credential;
use crate::error::ClientError;

/// URL scheme used to reach the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    #[default]
    Http,
    Https,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }

    pub fn default_port(&self) -> u16 {
        match self {
            Scheme::Http => 80,
            Scheme::Https => 443,
        }
    }
}

/// The options that drive the interaction with the server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RequestOptions {
    #[serde(default)]
    pub scheme: Scheme,
    /// Host name or address, without scheme, port or path.
    pub host: String,
    /// Explicit port; the scheme's default when absent.
    #[serde(default)]
    pub port: Option<u16>,
    /// Path prefix under which the service is mounted, such as `/api`.
    #[serde(default)]
    pub base_path: Option<String>,
    #[serde(default)]
    pub credential: Option<Credential>,
    /// The project name to use.
    pub project: String,
    /// The user that owns the project. Defaults to the credential's user.
    #[serde(default)]
    pub owner: Option<String>,
    /// Technology stacks, sent in order.
    #[serde(default)]
    pub stacks: Vec<String>,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub profile: Option<String>,
    /// Build and validate requests but never send them.
    #[serde(default, alias = "dry")]
    pub dry_run: bool,
    /// Ask the server to support Android.
    #[serde(default)]
    pub android: bool,
    /// Ask the server to support automated repackaging.
    #[serde(default)]
    pub auto_repackaging: bool,
    /// The target server refuses snapshots without at least one stack.
    #[serde(default)]
    pub require_stacks: bool,
}

impl RequestOptions {
    pub fn new(host: impl Into<String>, project: impl Into<String>) -> Self {
        Self {
            scheme: Scheme::default(),
            host: host.into(),
            port: None,
            base_path: None,
            credential: None,
            project: project.into(),
            owner: None,
            stacks: Vec::new(),
            platform: None,
            profile: None,
            dry_run: false,
            android: false,
            auto_repackaging: false,
            require_stacks: false,
        }
    }

    /// Parse a server prefix such as `www.service.com:8080/abc` or
    /// `https://svc.example.com/api`. The scheme defaults to `http`.
    pub fn from_host_prefix(prefix: &str, project: impl Into<String>) -> Result<Self, ClientError> {
        let prefix = prefix.trim();
        let (scheme, rest) = if let Some(rest) = prefix.strip_prefix("https://") {
            (Scheme::Https, rest)
        } else if let Some(rest) = prefix.strip_prefix("http://") {
            (Scheme::Http, rest)
        } else {
            (Scheme::Http, prefix)
        };

        let (authority, base_path) = match rest.find('/') {
            Some(i) => (&rest[..i], Some(rest[i..].to_string())),
            None => (rest, None),
        };

        let (host, port) = match authority.rsplit_once(':') {
            Some((host, port)) => {
                let port = port.parse::<u16>().map_err(|_| {
                    ClientError::Configuration(format!("invalid port `{port}` in `{prefix}`"))
                })?;
                (host, Some(port))
            }
            None => (authority, None),
        };

        let mut options = Self::new(host, project).with_scheme(scheme);
        options.port = port;
        options.base_path = base_path;
        Ok(options)
    }

    pub fn with_scheme(mut self, scheme: Scheme) -> Self {
        self.scheme = scheme;
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = Some(base_path.into());
        self
    }

    pub fn with_credential(mut self, credential: Credential) -> Self {
        self.credential = Some(credential);
        self
    }

    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub fn with_stacks<I, S>(mut self, stacks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stacks = stacks.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = Some(platform.into());
        self
    }

    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_android(mut self, android: bool) -> Self {
        self.android = android;
        self
    }

    pub fn with_auto_repackaging(mut self, auto_repackaging: bool) -> Self {
        self.auto_repackaging = auto_repackaging;
        self
    }

    pub fn with_require_stacks(mut self, require_stacks: bool) -> Self {
        self.require_stacks = require_stacks;
        self
    }

    /// The explicit port, or the scheme's default.
    pub fn effective_port(&self) -> u16 {
        self.port.unwrap_or_else(|| self.scheme.default_port())
    }

    /// The project owner: explicit `owner`, else the credential's user name.
    pub fn resolved_owner(&self) -> Option<&str> {
        self.owner
            .as_deref()
            .filter(|o| !o.is_empty())
            .or_else(|| {
                self.credential
                    .as_ref()
                    .map(Credential::username)
                    .filter(|u| !u.is_empty())
            })
    }

    /// Check that host and port name a reachable endpoint.
    pub fn validate_endpoint(&self) -> Result<(), ClientError> {
        let host = self.host.trim();
        if host.is_empty() {
            return Err(ClientError::Configuration("host is empty".to_string()));
        }
        if host.contains(['/', ':', '?', '#', '@', ' ']) {
            return Err(ClientError::Configuration(format!(
                "host `{host}` must be a bare host name; use from_host_prefix for `host:port/path` forms"
            )));
        }
        if self.port == Some(0) {
            return Err(ClientError::Configuration(
                "port must be in 1-65535".to_string(),
            ));
        }
        Ok(())
    }

    /// Endpoint checks plus the requirements of project-scoped operations.
    pub fn validate_project(&self) -> Result<(), ClientError> {
        self.validate_endpoint()?;
        if self.project.trim().is_empty() {
            return Err(ClientError::Configuration("project is empty".to_string()));
        }
        if self.require_stacks && self.stacks.is_empty() {
            return Err(ClientError::Configuration(
                "server requires at least one technology stack".to_string(),
            ));
        }
        Ok(())
    }

    /// Join scheme, host, port, base path and `path` into a URL.
    ///
    /// Empty segments are dropped, so each component is separated by exactly
    /// one `/` regardless of leading or trailing slashes. Segments are
    /// percent-encoded. The host is normalised the way URL hosts are:
    /// lowercased, and IDNA-encoded when it is not ASCII.
    pub fn endpoint_url(&self, path: &str) -> Result<String, ClientError> {
        let segments: Vec<&str> = path.split('/').collect();
        self.endpoint_url_from_segments(&segments)
    }

    /// Like `endpoint_url`, but each element is one segment, so a `/` inside
    /// an element is encoded rather than treated as a separator.
    pub(crate) fn endpoint_url_from_segments(&self, segments: &[&str]) -> Result<String, ClientError> {
        self.validate_endpoint()?;
        let host = self.host.trim();
        let port = self.effective_port();
        let scheme = self.scheme.as_str();

        let mut url = Url::parse(&format!("{scheme}://{host}:{port}/"))
            .map_err(|e| ClientError::Configuration(format!("invalid host `{host}`: {e}")))?;
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| ClientError::Configuration(format!("host `{host}` cannot carry a path")))?;
            path.clear();
            let base = self.base_path.as_deref().unwrap_or_default().split('/');
            for segment in base.chain(segments.iter().copied()).filter(|s| !s.is_empty()) {
                path.push(segment);
            }
        }

        let host = url.host_str().unwrap_or(host);
        Ok(format!("{scheme}://{host}:{port}{}", url.path()))
    }

    /// URL of `{base}/{owner}/{project}` followed by `suffix`, if any.
    pub(crate) fn project_url(&self, suffix: Option<&str>) -> Result<String, ClientError> {
        self.validate_project()?;
        let mut segments = Vec::with_capacity(3);
        if let Some(owner) = self.resolved_owner() {
            segments.push(owner);
        }
        segments.push(self.project.trim());
        if let Some(suffix) = suffix {
            segments.push(suffix);
        }
        self.endpoint_url_from_segments(&segments)
    }
}
