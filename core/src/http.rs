//! HTTP request and response types as plain data.
//!
//! # Design
//! The client builds `HttpRequest` values and parses `HttpResponse` values;
//! only a `Transport` touches the network. A body is either raw bytes or a
//! multipart form that the transport encodes when it sends the request.
//!
//! `DELETE` is not special-cased: any method may carry a body here. The
//! analysis service's delete-project endpoint reads the project identity from
//! the request body, so `delete_with_body` exists to build exactly that shape.

use std::fmt;

use crate::multipart::MultipartForm;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Delete,
}

impl HttpMethod {
    /// The method token as written on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entity body of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
    Bytes(Vec<u8>),
    Multipart(MultipartForm),
}

impl RequestBody {
    /// Payload size. For a form, the field values without framing.
    pub fn len(&self) -> usize {
        match self {
            RequestBody::Bytes(bytes) => bytes.len(),
            RequestBody::Multipart(form) => form.payload_len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// An HTTP request described as plain data.
///
/// Built by `AnalysisClient::build_*` methods and executed by a `Transport`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<RequestBody>,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// A `DELETE` request that carries an entity body.
    pub fn delete_with_body(
        url: impl Into<String>,
        content_type: &str,
        body: impl Into<Vec<u8>>,
    ) -> Self {
        Self::new(HttpMethod::Delete, url)
            .with_header("content-type", content_type)
            .with_body(body)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(RequestBody::Bytes(body.into()));
        self
    }

    /// Attach a multipart form. The transport sets the `content-type`
    /// header with the boundary it picks.
    pub fn with_form(mut self, form: MultipartForm) -> Self {
        self.body = Some(RequestBody::Multipart(form));
        self
    }

    /// First header named `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    pub fn body_len(&self) -> usize {
        self.body.as_ref().map_or(0, RequestBody::len)
    }

    /// The body, if it is raw bytes.
    pub fn body_bytes(&self) -> Option<&[u8]> {
        match &self.body {
            Some(RequestBody::Bytes(bytes)) => Some(bytes.as_slice()),
            _ => None,
        }
    }

    /// The body, if it is a multipart form.
    pub fn form(&self) -> Option<&MultipartForm> {
        match &self.body {
            Some(RequestBody::Multipart(form)) => Some(form),
            _ => None,
        }
    }
}

/// An HTTP response described as plain data.
///
/// Produced by a `Transport`, then passed to `AnalysisClient::parse_*`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delete_with_body_keeps_method_and_bytes() {
        let body = br#"{"project":"demo"}"#.to_vec();
        let req = HttpRequest::delete_with_body(
            "http://localhost:8080/api/alice/demo",
            "application/json",
            body.clone(),
        );
        assert_eq!(req.method.as_str(), "DELETE");
        assert_eq!(req.body_bytes(), Some(body.as_slice()));
        assert_eq!(req.header("Content-Type"), Some("application/json"));
    }

    #[test]
    fn delete_with_body_accepts_binary_payloads() {
        let body = vec![0u8, 159, 146, 150, 255];
        let req = HttpRequest::delete_with_body("http://h:1/x", "application/octet-stream", body.clone());
        assert_eq!(req.method, HttpMethod::Delete);
        assert_eq!(req.body, Some(RequestBody::Bytes(body)));
        assert_eq!(req.body_len(), 5);
        assert!(req.form().is_none());
    }

    #[test]
    fn form_body_reports_payload_length() {
        let form = MultipartForm::new()
            .text("platform", "java_8")
            .part("input", "app.jar", "application/octet-stream", &[1, 2, 3]);
        let req = HttpRequest::new(HttpMethod::Post, "http://h:1/snapshot").with_form(form.clone());
        assert_eq!(req.form(), Some(&form));
        assert_eq!(req.body_bytes(), None);
        assert_eq!(req.body_len(), 6 + 3);
    }

    #[test]
    fn header_lookup_is_case_insensitive() {
        let req = HttpRequest::new(HttpMethod::Get, "http://h:1/")
            .with_header("Authorization", "Basic abc");
        assert_eq!(req.header("authorization"), Some("Basic abc"));
        assert_eq!(req.header("x-missing"), None);
        assert_eq!(req.body_len(), 0);
    }

    #[test]
    fn response_success_range() {
        assert!(HttpResponse::new(200, "").is_success());
        assert!(HttpResponse::new(204, "").is_success());
        assert!(!HttpResponse::new(302, "").is_success());
        assert!(!HttpResponse::new(404, "").is_success());
    }

    #[test]
    fn method_display_matches_wire_token() {
        assert_eq!(HttpMethod::Get.to_string(), "GET");
        assert_eq!(HttpMethod::Post.to_string(), "POST");
        assert_eq!(HttpMethod::Delete.to_string(), "DELETE");
    }
}
