//! Base URL handling and per-call target resolution.
//!
//! # Design
//! An `Endpoint` is validated once, when the client is built, and is never
//! mutated afterwards. Each call derives its `Target` from the base path and
//! the call's segment, so repeated calls cannot accumulate path components.

use url::Url;

use crate::error::ClientError;

/// A validated absolute `http`/`https` base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    base: Url,
}

/// Where a single call goes, plus the values signed for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub url: String,
    /// `host[:port]`, as sent in `X-PARA-HOST`.
    pub host: String,
    /// Normalized joined path exactly as it appears in `url`, percent
    /// encoded, as sent in `X-PARA-PATH`.
    pub path: String,
}

impl Endpoint {
    /// # Errors
    ///
    /// Returns `ClientError::InvalidUrl` for anything that is not an absolute
    /// `http` or `https` URL with a host.
    pub fn parse(raw: &str) -> Result<Self, ClientError> {
        let invalid = |reason: String| ClientError::InvalidUrl {
            url: raw.to_string(),
            reason,
        };
        let base = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme {:?}", base.scheme())));
        }
        if base.host_str().is_none() || base.cannot_be_a_base() {
            return Err(invalid("missing host".to_string()));
        }
        Ok(Self { base })
    }

    /// `host[:port]`; the port only appears when it is not the scheme default.
    pub fn host(&self) -> String {
        let host = self.base.host_str().unwrap_or_default();
        match self.base.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        }
    }

    pub fn resolve(&self, segment: &str) -> Target {
        let mut url = self.base.clone();
        url.set_path(&join_paths(self.base.path(), segment));
        url.set_query(None);
        url.set_fragment(None);
        Target {
            path: url.path().to_string(),
            url: url.to_string(),
            host: self.host(),
        }
    }
}

/// Join two URL paths and clean the result: duplicate separators collapse,
/// `.` is dropped, `..` climbs (never above the root), and there is no
/// trailing separator. The result is always rooted.
pub fn join_paths(base: &str, segment: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for part in base.split('/').chain(segment.split('/')) {
        match part {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            part => parts.push(part),
        }
    }
    format!("/{}", parts.join("/"))
}
