//! URL model: scheme, host, port, path and query.
//!
//! # Design
//! Unlike a strict URL type, a `Resource` may be partial: `"/users"`,
//! `"?page=2"` and `"https://"` are all valid. That is what lets the client
//! overlay a per-call URL onto its configured base with `merge`.
//!
//! Userinfo and fragments are accepted while parsing but not kept.

use std::fmt;
use std::str::FromStr;

use crate::error::ApiError;
use crate::params::Params;
use crate::path::Path;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resource {
    pub scheme: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub path: Path,
    pub query: Params,
}

impl Resource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(url: &str) -> Result<Self, ApiError> {
        let mut resource = Resource::new();

        let url = url.split_once('#').map_or(url, |(before, _)| before);
        let (rest, query) = match url.split_once('?') {
            Some((rest, query)) => (rest, Some(query)),
            None => (url, None),
        };

        let authority_and_path = match rest.split_once("://") {
            Some((scheme, after)) if is_scheme(scheme) => {
                resource.scheme = Some(scheme.to_string());
                Some(after)
            }
            _ => rest.strip_prefix("//"),
        };

        let path = match authority_and_path {
            Some(after) => {
                let (authority, path) = match after.find('/') {
                    Some(slash) => after.split_at(slash),
                    None => (after, ""),
                };
                resource.parse_authority(authority)?;
                path
            }
            None => rest,
        };

        resource.path = Path::from(path);
        if let Some(query) = query {
            resource.query = Params::parse(query);
        }
        Ok(resource)
    }

    fn parse_authority(&mut self, authority: &str) -> Result<(), ApiError> {
        let host_port = authority.rsplit_once('@').map_or(authority, |(_, hp)| hp);
        let (host, port) = if host_port.starts_with('[') {
            match host_port.find(']') {
                Some(end) => {
                    let (host, tail) = host_port.split_at(end + 1);
                    (host, tail.strip_prefix(':'))
                }
                None => return Err(ApiError::InvalidUrl(format!("unterminated IPv6 host `{host_port}`"))),
            }
        } else {
            match host_port.rsplit_once(':') {
                Some((host, port)) => (host, Some(port)),
                None => (host_port, None),
            }
        };

        if !host.is_empty() {
            self.host = Some(host.to_string());
        }
        self.port = match port {
            None | Some("") => None,
            Some(port) => Some(parse_port(port)?),
        };
        Ok(())
    }

    /// Overlay `other` onto this resource. Scheme, host and port come from
    /// `other` when present; path and query come from `other` when
    /// non-empty. The query's `indexed` flag is always inherited from self.
    pub fn merge(&self, other: &Resource) -> Resource {
        let path = if other.path.is_empty() {
            self.path.clone()
        } else {
            other.path.clone()
        };
        let query = if other.query.is_empty() {
            self.query.clone()
        } else {
            other.query.clone()
        };
        Resource {
            scheme: other.scheme.clone().or_else(|| self.scheme.clone()),
            host: other.host.clone().or_else(|| self.host.clone()),
            port: other.port.or(self.port),
            path,
            query: query.indexed(self.query.is_indexed()),
        }
    }
}

fn is_scheme(s: &str) -> bool {
    let mut chars = s.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

fn parse_port(port: &str) -> Result<u16, ApiError> {
    let valid = port.bytes().all(|b| b.is_ascii_digit());
    match port.parse::<u16>() {
        Ok(number) if valid && number > 0 => Ok(number),
        _ => Err(ApiError::InvalidUrl(format!("invalid port `{port}`"))),
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(scheme) = &self.scheme {
            write!(f, "{scheme}://")?;
        }
        if let Some(host) = &self.host {
            f.write_str(host)?;
        }
        if let Some(port) = self.port {
            write!(f, ":{port}")?;
        }
        if !self.path.is_empty() {
            if !self.path.is_absolute() {
                f.write_str("/")?;
            }
            write!(f, "{}", self.path)?;
        }
        let located = self.host.is_some() || self.port.is_some() || !self.path.is_empty();
        if !self.query.is_empty() && located {
            f.write_str("?")?;
        }
        write!(f, "{}", self.query)
    }
}

impl FromStr for Resource {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Resource::parse(s)
    }
}
