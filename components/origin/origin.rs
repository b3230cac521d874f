/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::fmt;
use std::hash::{Hash, Hasher};

use log::debug;
use url::{Host, Url};
use uuid::Uuid;

use crate::MAX_INPUT_LENGTH;
use crate::error::ValidationError;
use crate::host;

/// The origin of a resource: either a (scheme, host, port) tuple or a unique opaque value.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Origin {
    /// A globally unique identifier
    Opaque(OpaqueOrigin),

    /// Consists of the scheme, host and port
    Tuple(TupleOrigin),
}

/// Opaque identifier for origins that cannot be expressed as a tuple.
///
/// Two opaque origins are equal only if one is a copy of the other.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct OpaqueOrigin(Uuid);

impl OpaqueOrigin {
    fn new() -> OpaqueOrigin {
        OpaqueOrigin(Uuid::new_v4())
    }
}

/// A (scheme, host, port) origin.
///
/// An absent port stands for the scheme's default port. Comparison treats the two spellings
/// as equal, but serialization keeps a port that was written out.
#[derive(Clone, Debug)]
pub struct TupleOrigin {
    scheme: String,
    host: Host,
    port: Option<u16>,
}

impl TupleOrigin {
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn host(&self) -> &Host {
        &self.host
    }

    /// The port as written, `None` when it was left to the scheme's default.
    pub fn port(&self) -> Option<u16> {
        self.port
    }

    /// The explicit port, or the scheme's default port. Schemes without a known default and
    /// without an explicit port have no effective port.
    pub fn effective_port(&self) -> Option<u16> {
        self.port.or_else(|| default_port(&self.scheme))
    }

    /// Whether the origin uses its scheme's default port, spelled out or not.
    pub(crate) fn uses_default_port(&self) -> bool {
        self.port.is_none() || self.port == default_port(&self.scheme)
    }
}

impl PartialEq for TupleOrigin {
    fn eq(&self, other: &TupleOrigin) -> bool {
        self.scheme == other.scheme &&
            self.host == other.host &&
            self.effective_port() == other.effective_port()
    }
}

impl Eq for TupleOrigin {}

impl Hash for TupleOrigin {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.scheme.hash(state);
        self.host.hash(state);
        self.effective_port().hash(state);
    }
}

impl Origin {
    /// Creates a new opaque origin that is only equal to itself.
    pub fn new_opaque() -> Origin {
        Origin::Opaque(OpaqueOrigin::new())
    }

    /// Parses a serialized origin, returning `None` for anything that is not one.
    ///
    /// `"null"` yields a fresh opaque origin each time it is parsed.
    pub fn parse(input: &str) -> Option<Origin> {
        match Origin::parse_serialization(input) {
            Ok(origin) => Some(origin),
            Err(error) => {
                debug!("{input:?} is not a serialized origin: {error}");
                None
            },
        }
    }

    /// Like [`Origin::construct`], but an empty string is rejected too.
    pub fn parse_serialization(input: &str) -> Result<Origin, ValidationError> {
        if input.len() > MAX_INPUT_LENGTH {
            return Err(ValidationError::TooLong);
        }
        if input == "null" {
            return Ok(Origin::new_opaque());
        }

        let (scheme, authority) = input
            .split_once("://")
            .ok_or(ValidationError::MissingSchemeSeparator)?;
        if !is_canonical_scheme(scheme) {
            return Err(ValidationError::InvalidScheme(scheme.to_owned()));
        }
        if authority.contains('@') {
            return Err(ValidationError::Credentials);
        }
        if let Some(index) = authority.find(['/', '\\', '?', '#']) {
            return Err(ValidationError::TrailingInput(authority[index..].to_owned()));
        }

        let (host, port) = split_host_and_port(authority)?;
        let host = host::canonicalize(host)?;
        let port = port.map(parse_port).transpose()?;

        Ok(Origin::Tuple(TupleOrigin {
            scheme: scheme.to_owned(),
            host,
            port,
        }))
    }

    /// Builds an origin from its serialization. A missing or empty input gives a new opaque
    /// origin; any other input that is not a serialized origin is an error.
    pub fn construct(input: Option<&str>) -> Result<Origin, ValidationError> {
        match input {
            None | Some("") => Ok(Origin::new_opaque()),
            Some(input) => Origin::parse_serialization(input),
        }
    }

    /// <https://url.spec.whatwg.org/#concept-url-origin>
    pub fn from_url(url: &Url) -> Origin {
        match url.origin() {
            url::Origin::Opaque(_) => Origin::new_opaque(),
            url::Origin::Tuple(scheme, host, port) => {
                let port = Some(port).filter(|port| default_port(&scheme) != Some(*port));
                Origin::Tuple(TupleOrigin { scheme, host, port })
            },
        }
    }

    pub fn scheme(&self) -> Option<&str> {
        match *self {
            Origin::Opaque(_) => None,
            Origin::Tuple(ref tuple) => Some(tuple.scheme()),
        }
    }

    pub fn host(&self) -> Option<&Host> {
        match *self {
            Origin::Opaque(_) => None,
            Origin::Tuple(ref tuple) => Some(tuple.host()),
        }
    }

    pub fn port(&self) -> Option<u16> {
        match *self {
            Origin::Opaque(_) => None,
            Origin::Tuple(ref tuple) => tuple.port(),
        }
    }

    pub fn effective_port(&self) -> Option<u16> {
        match *self {
            Origin::Opaque(_) => None,
            Origin::Tuple(ref tuple) => tuple.effective_port(),
        }
    }

    /// Return whether this origin is a (scheme, host, port) tuple
    /// (as opposed to an opaque origin).
    pub fn is_tuple(&self) -> bool {
        matches!(*self, Origin::Tuple(..))
    }

    pub fn is_opaque(&self) -> bool {
        matches!(*self, Origin::Opaque(..))
    }

    /// <https://html.spec.whatwg.org/multipage/#same-origin>
    pub fn is_same_origin(&self, other: &Origin) -> bool {
        self == other
    }

    /// <https://html.spec.whatwg.org/multipage/#ascii-serialisation-of-an-origin>
    ///
    /// Every opaque origin serializes to `null`.
    pub fn ascii_serialization(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Origin::Opaque(_) => f.write_str("null"),
            Origin::Tuple(ref tuple) => fmt::Display::fmt(tuple, f),
        }
    }
}

impl fmt::Display for TupleOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.scheme, self.host)?;
        match self.port {
            Some(port) => write!(f, ":{port}"),
            None => Ok(()),
        }
    }
}

/// The default port of the special schemes that have one.
pub(crate) fn default_port(scheme: &str) -> Option<u16> {
    match scheme {
        "http" | "ws" => Some(80),
        "https" | "wss" => Some(443),
        "ftp" => Some(21),
        _ => None,
    }
}

/// <https://url.spec.whatwg.org/#scheme-state>, restricted to the lower-case form a URL
/// parser would have produced.
fn is_canonical_scheme(scheme: &str) -> bool {
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_lowercase()) &&
        chars.all(|c| matches!(c, 'a'..='z' | '0'..='9' | '+' | '-' | '.'))
}

fn split_host_and_port(authority: &str) -> Result<(&str, Option<&str>), ValidationError> {
    if authority.starts_with('[') {
        let Some(end) = authority.find(']') else {
            return Err(ValidationError::InvalidHost(authority.to_owned()));
        };
        let (host, rest) = authority.split_at(end + 1);
        return match rest {
            "" => Ok((host, None)),
            _ => match rest.strip_prefix(':') {
                Some(port) => Ok((host, Some(port))),
                None => Err(ValidationError::TrailingInput(rest.to_owned())),
            },
        };
    }

    Ok(match authority.split_once(':') {
        Some((host, port)) => (host, Some(port)),
        None => (authority, None),
    })
}

/// Ports are serialized as decimal numbers without leading zeros.
fn parse_port(port: &str) -> Result<u16, ValidationError> {
    let invalid = || ValidationError::InvalidPort(port.to_owned());
    if port.is_empty() || !port.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    if port.len() > 1 && port.starts_with('0') {
        return Err(invalid());
    }
    port.parse().map_err(|_| invalid())
}
