/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use thiserror::Error;

use crate::MAX_INPUT_LENGTH;

/// A string that is not a canonical serialized origin.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum ValidationError {
    #[error("input is longer than {MAX_INPUT_LENGTH} bytes")]
    TooLong,
    #[error("missing \"://\" after the scheme")]
    MissingSchemeSeparator,
    #[error("invalid scheme {0:?}")]
    InvalidScheme(String),
    #[error("a serialized origin cannot carry credentials")]
    Credentials,
    #[error("{0:?} is not a canonical host")]
    InvalidHost(String),
    #[error("invalid port {0:?}")]
    InvalidPort(String),
    #[error("unexpected {0:?} after the origin")]
    TrailingInput(String),
}

/// An origin pattern that cannot be compiled.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum SpecificationError {
    #[error("pattern is longer than {MAX_INPUT_LENGTH} bytes")]
    TooLong,
    /// Only `protocol`, `hostname` and `port` may appear in a pattern record.
    #[error("unknown pattern field {0:?}")]
    UnknownField(String),
    #[error("invalid pattern record: {0}")]
    InvalidInit(String),
    #[error("pattern string has no \"://\" after its protocol")]
    MissingProtocol,
    /// The pattern string describes more than a protocol, a hostname and a port.
    #[error("origin patterns cannot contain a {0}")]
    UnexpectedComponent(&'static str),
    #[error("the {0} pattern is empty")]
    EmptyField(&'static str),
    #[error("failed to tokenize the {field} pattern at byte {position}")]
    Tokenize { field: &'static str, position: usize },
    #[error("{literal:?} is not allowed in the {field} pattern")]
    InvalidLiteral { field: &'static str, literal: String },
    #[error("unbalanced group")]
    UnbalancedGroup,
    #[error("groups cannot be nested")]
    NestedGroup,
    #[error("unsupported modifier {0:?}")]
    UnsupportedModifier(String),
    #[error("duplicate group name {0:?}")]
    DuplicateName(String),
    #[error("regular expression groups are not supported")]
    RegexpGroup,
}

/// The public suffix table could not be loaded.
///
/// Once this happens the resolver refuses to answer, it never guesses.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum ConfigurationError {
    #[error("could not read the public suffix list: {0}")]
    Unreadable(String),
    #[error("the public suffix list is not valid UTF-8")]
    NotUtf8,
    #[error("invalid public suffix rule {rule:?} on line {line}")]
    InvalidRule { line: usize, rule: String },
    #[error("the public suffix list has no rules")]
    Empty,
}
