//! HTTP request and response values exchanged with a `Transport`.
//!
//! # Design
//! Requests and responses are plain owned data. `MinionClient` builds and
//! signs an `HttpRequest` without touching the network, a `Transport`
//! executes it, and the classifier consumes the resulting `HttpResponse`.
//! A request is built fresh for every call and never mutated after signing.

use std::time::Duration;

use crate::headers::find_header;

/// HTTP method for a request. The protocol only defines POST.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Post => "POST",
        }
    }
}

/// A signed request ready for the wire.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
    /// Per-call deadline; `None` defers to the transport's configuration.
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Replace the value of `name`, or append it if absent.
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self
            .headers
            .iter_mut()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
        {
            Some((_, existing)) => *existing = value,
            None => self.headers.push((name.to_string(), value)),
        }
    }
}

/// A response as received from the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Post,
            url: "http://localhost:3000/bootstrap".to_string(),
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: None,
            timeout: None,
        }
    }

    #[test]
    fn set_header_replaces_case_insensitively() {
        let mut req = request();
        req.set_header("content-type", "text/plain");
        assert_eq!(req.headers.len(), 1);
        assert_eq!(req.header("CONTENT-TYPE"), Some("text/plain"));
    }

    #[test]
    fn set_header_appends_new_names() {
        let mut req = request();
        req.set_header("X-PARA-QUERY", "");
        assert_eq!(req.headers.len(), 2);
        assert_eq!(req.header("x-para-query"), Some(""));
    }

    #[test]
    fn method_wire_name() {
        assert_eq!(HttpMethod::Post.as_str(), "POST");
    }
}
