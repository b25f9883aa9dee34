//! Credentials and the ways a server expects to receive them.

use std::fmt;

use base64::prelude::*;
use serde::Deserialize;

const REDACTED: &str = "<redacted>";

/// A user name plus the secret that authenticates it (password or API key,
/// depending on server configuration).
///
/// Immutable once built. No validation happens here; the server decides
/// whether an empty user or secret is acceptable.
///
/// `Debug` and `Display` never print the secret. Use [`Credential::reveal`]
/// when a cleartext rendering is really wanted.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct Credential {
    username: String,
    #[serde(alias = "password", alias = "token")]
    secret: String,
}

impl Credential {
    pub fn new(username: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            secret: secret.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    /// Cleartext rendering, `{ user: alice, auth-value: s3cret }`.
    pub fn reveal(&self) -> Revealed<'_> {
        Revealed(self)
    }

    fn basic_header_value(&self) -> String {
        let pair = format!("{}:{}", self.username, self.secret);
        format!("Basic {}", BASE64_STANDARD.encode(pair))
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{ user: {}, auth-value: {REDACTED} }}", self.username)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("username", &self.username)
            .field("secret", &REDACTED)
            .finish()
    }
}

/// Unredacted view of a [`Credential`], returned by [`Credential::reveal`].
pub struct Revealed<'a>(&'a Credential);

impl fmt::Display for Revealed<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{ user: {}, auth-value: {} }}",
            self.0.username, self.0.secret
        )
    }
}

/// How a credential is attached to outgoing requests.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthScheme {
    /// `Authorization: Basic base64(user:secret)`.
    #[default]
    Basic,
    /// One header for the user name and one for the secret.
    Header {
        user_header: String,
        token_header: String,
    },
    /// Body fields, for servers that read credentials from the form or JSON
    /// payload. Requests without a body fall back to `Basic`.
    Form {
        user_field: String,
        token_field: String,
    },
}

impl AuthScheme {
    /// `x-auth-user` / `x-auth-token` headers.
    pub fn api_key_headers() -> Self {
        AuthScheme::Header {
            user_header: "x-auth-user".to_string(),
            token_header: "x-auth-token".to_string(),
        }
    }

    /// `username` / `token` body fields.
    pub fn form_fields() -> Self {
        AuthScheme::Form {
            user_field: "username".to_string(),
            token_field: "token".to_string(),
        }
    }

    /// Headers carrying `credential` on a request. `has_body` tells whether
    /// the request can carry the credential in its payload instead.
    pub(crate) fn headers(&self, credential: &Credential, has_body: bool) -> Vec<(String, String)> {
        match self {
            AuthScheme::Basic => vec![basic(credential)],
            AuthScheme::Header {
                user_header,
                token_header,
            } => vec![
                (user_header.clone(), credential.username.clone()),
                (token_header.clone(), credential.secret.clone()),
            ],
            AuthScheme::Form { .. } if has_body => Vec::new(),
            AuthScheme::Form { .. } => vec![basic(credential)],
        }
    }

    /// Body fields carrying `credential`, when this scheme sends them in the payload.
    pub(crate) fn body_fields<'a>(&'a self, credential: &'a Credential) -> Vec<(&'a str, &'a str)> {
        match self {
            AuthScheme::Form {
                user_field,
                token_field,
            } => vec![
                (user_field.as_str(), credential.username.as_str()),
                (token_field.as_str(), credential.secret.as_str()),
            ],
            _ => Vec::new(),
        }
    }
}

fn basic(credential: &Credential) -> (String, String) {
    ("authorization".to_string(), credential.basic_header_value())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_and_debug_redact_secret() {
        let cred = Credential::new("alice", "s3cret");
        let shown = cred.to_string();
        assert_eq!(shown, "{ user: alice, auth-value: <redacted> }");
        assert!(!format!("{cred:?}").contains("s3cret"));
        assert!(format!("{cred:?}").contains("alice"));
    }

    #[test]
    fn reveal_is_explicit_opt_in() {
        let cred = Credential::new("alice", "s3cret");
        assert_eq!(
            cred.reveal().to_string(),
            "{ user: alice, auth-value: s3cret }"
        );
    }

    #[test]
    fn empty_fields_are_accepted() {
        let cred = Credential::new("", "");
        assert_eq!(cred.username(), "");
        assert_eq!(cred.secret(), "");
    }

    #[test]
    fn basic_header_encodes_user_and_secret() {
        let cred = Credential::new("Aladdin", "open sesame");
        let headers = AuthScheme::Basic.headers(&cred, false);
        assert_eq!(
            headers,
            vec![(
                "authorization".to_string(),
                "Basic QWxhZGRpbjpvcGVuIHNlc2FtZQ==".to_string()
            )]
        );
        assert!(AuthScheme::Basic.body_fields(&cred).is_empty());
    }

    #[test]
    fn header_scheme_uses_custom_names() {
        let cred = Credential::new("bob", "key-123");
        let headers = AuthScheme::api_key_headers().headers(&cred, true);
        assert_eq!(
            headers,
            vec![
                ("x-auth-user".to_string(), "bob".to_string()),
                ("x-auth-token".to_string(), "key-123".to_string()),
            ]
        );
    }

    #[test]
    fn form_scheme_moves_credential_into_body() {
        let cred = Credential::new("bob", "key-123");
        let scheme = AuthScheme::form_fields();
        assert!(scheme.headers(&cred, true).is_empty());
        assert_eq!(
            scheme.body_fields(&cred),
            vec![("username", "bob"), ("token", "key-123")]
        );
    }

    #[test]
    fn form_scheme_falls_back_to_basic_without_body() {
        let cred = Credential::new("bob", "key-123");
        let headers = AuthScheme::form_fields().headers(&cred, false);
        assert_eq!(headers.len(), 1);
        assert_eq!(headers[0].0, "authorization");
        assert!(headers[0].1.starts_with("Basic "));
    }

    #[test]
    fn deserializes_from_config() {
        let cred: Credential =
            serde_json::from_str(r#"{"username":"carol","password":"pw"}"#).unwrap();
        assert_eq!(cred.secret(), "pw");

        let scheme: AuthScheme = serde_json::from_str(
            r#"{"type":"header","user_header":"x-user","token_header":"x-key"}"#,
        )
        .unwrap();
        assert_eq!(
            scheme,
            AuthScheme::Header {
                user_header: "x-user".into(),
                token_header: "x-key".into()
            }
        );
        let scheme: AuthScheme = serde_json::from_str(r#"{"type":"basic"}"#).unwrap();
        assert_eq!(scheme, AuthScheme::Basic);
    }
}
