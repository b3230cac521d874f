/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Validation of hosts that are supposed to be in their serialized, canonical form.
//!
//! The host parser of the `url` crate decides what a host *means*. A host is accepted only
//! when serializing that meaning gives back exactly the input: upper-case letters, raw
//! Unicode, percent-escapes and numeric reinterpretations (`1234567890` is the IPv4 address
//! `73.150.2.210`) all fail that test and are rejected rather than repaired.

use log::debug;
use url::Host;

use crate::error::ValidationError;

/// Returns the parsed host if `input` is already a canonical ASCII host serialization.
pub fn canonicalize(input: &str) -> Result<Host, ValidationError> {
    let invalid = || ValidationError::InvalidHost(input.to_owned());

    if input.is_empty() || !input.is_ascii() {
        return Err(invalid());
    }
    if input
        .chars()
        .any(|c| c.is_ascii_uppercase() || c == '%' || c.is_ascii_whitespace())
    {
        return Err(invalid());
    }
    // Empty labels, including the one a trailing dot produces, make two spellings of the
    // same host possible.
    if !input.starts_with('[') && input.split('.').any(str::is_empty) {
        return Err(invalid());
    }

    let host = Host::parse(input).map_err(|error| {
        debug!("Rejecting host {input:?}: {error}");
        invalid()
    })?;
    if host.to_string() != input {
        debug!("Rejecting host {input:?}: it serializes as {host}");
        return Err(invalid());
    }
    Ok(host)
}

/// Code points that may appear in the literal text of a hostname pattern.
///
/// These are the code points of canonical hosts: lower-case ASCII letters, digits, `-`, `.`
/// and `_`, plus the brackets and colons of IPv6 literals.
pub(crate) fn is_pattern_literal_code_point(c: char) -> bool {
    matches!(c, 'a'..='z' | '0'..='9' | '-' | '.' | '_' | '[' | ']' | ':')
}
