/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Patterns over the protocol, hostname and port of an origin.
//!
//! The syntax is the one of <https://urlpattern.spec.whatwg.org/> restricted to those three
//! fields: literal text, `*`, `:name` groups and `{...}` groups, where names, wildcards and
//! groups may be made optional with `?`. Regular expression groups and the `+` and `*`
//! modifiers are not supported.

mod component;
mod constructor_parser;
mod tokenizer;

use std::collections::HashMap;

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use self::component::{Component, ComponentKind};
use self::constructor_parser::parse_a_constructor_string;
use crate::MAX_INPUT_LENGTH;
use crate::error::SpecificationError;
use crate::origin::Origin;

const INIT_FIELDS: [&str; 3] = ["protocol", "hostname", "port"];

/// The record form of a pattern. A missing field matches anything.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OriginPatternInit {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<String>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum OriginPatternInput {
    /// `protocol://hostname[:port]`. Without a port, only the default port matches.
    String(String),
    Init(OriginPatternInit),
}

impl OriginPatternInput {
    /// Interprets a JSON string or object, rejecting objects with keys other than
    /// `protocol`, `hostname` and `port`.
    pub fn from_json(value: &Value) -> Result<OriginPatternInput, SpecificationError> {
        match value {
            Value::String(pattern) => Ok(OriginPatternInput::String(pattern.clone())),
            Value::Object(map) => {
                if let Some(key) = map.keys().find(|key| !INIT_FIELDS.contains(&key.as_str())) {
                    return Err(SpecificationError::UnknownField(key.clone()));
                }
                serde_json::from_value(value.clone())
                    .map(OriginPatternInput::Init)
                    .map_err(|error| SpecificationError::InvalidInit(error.to_string()))
            },
            other => Err(SpecificationError::InvalidInit(format!(
                "expected a string or an object, got {other}"
            ))),
        }
    }
}

impl From<&str> for OriginPatternInput {
    fn from(pattern: &str) -> OriginPatternInput {
        OriginPatternInput::String(pattern.to_owned())
    }
}

impl From<String> for OriginPatternInput {
    fn from(pattern: String) -> OriginPatternInput {
        OriginPatternInput::String(pattern)
    }
}

impl From<OriginPatternInit> for OriginPatternInput {
    fn from(init: OriginPatternInit) -> OriginPatternInput {
        OriginPatternInput::Init(init)
    }
}

/// A compiled origin pattern. Immutable, and cheap to evaluate repeatedly.
#[derive(Clone, Debug)]
pub struct OriginPattern {
    protocol: Component,
    hostname: Component,
    port: Component,
}

impl OriginPattern {
    pub fn compile(input: impl Into<OriginPatternInput>) -> Result<OriginPattern, SpecificationError> {
        let input = input.into();
        OriginPattern::compile_input(&input).inspect_err(|error| {
            debug!("Could not compile origin pattern {input:?}: {error}");
        })
    }

    fn compile_input(input: &OriginPatternInput) -> Result<OriginPattern, SpecificationError> {
        let parsed;
        let init = match *input {
            OriginPatternInput::String(ref pattern) => {
                if pattern.len() > MAX_INPUT_LENGTH {
                    return Err(SpecificationError::TooLong);
                }
                parsed = parse_a_constructor_string(pattern)?;
                &parsed
            },
            OriginPatternInput::Init(ref init) => init,
        };

        let compile_field = |kind: ComponentKind, source: &Option<String>| {
            let source = source.as_deref().unwrap_or("*");
            if source.len() > MAX_INPUT_LENGTH {
                return Err(SpecificationError::TooLong);
            }
            Component::compile(kind, source)
        };
        let pattern = OriginPattern {
            protocol: compile_field(ComponentKind::Protocol, &init.protocol)?,
            hostname: compile_field(ComponentKind::Hostname, &init.hostname)?,
            port: compile_field(ComponentKind::Port, &init.port)?,
        };

        let mut names: Vec<&String> = vec![];
        for name in pattern.components().flat_map(Component::names) {
            if names.contains(&name) {
                return Err(SpecificationError::DuplicateName(name.clone()));
            }
            names.push(name);
        }
        Ok(pattern)
    }

    fn components(&self) -> impl Iterator<Item = &Component> {
        [&self.protocol, &self.hostname, &self.port].into_iter()
    }

    pub fn protocol(&self) -> &str {
        self.protocol.source()
    }

    pub fn hostname(&self) -> &str {
        self.hostname.source()
    }

    pub fn port(&self) -> &str {
        self.port.source()
    }

    pub fn test(&self, origin: &Origin) -> bool {
        self.exec(origin).is_some()
    }

    /// Matches `origin`, returning the text captured by every named group that took part in
    /// the match.
    ///
    /// An opaque origin has no fields to inspect. It is matched as empty text in all three
    /// fields, which only wildcards accept.
    pub fn exec(&self, origin: &Origin) -> Option<HashMap<String, String>> {
        let mut groups = HashMap::new();
        match *origin {
            Origin::Opaque(_) => {
                for component in self.components() {
                    groups.extend(component.exec("")?);
                }
            },
            Origin::Tuple(ref tuple) => {
                groups.extend(self.protocol.exec(tuple.scheme())?);
                groups.extend(self.hostname.exec(&tuple.host().to_string())?);

                let port = tuple
                    .effective_port()
                    .map(|port| port.to_string())
                    .unwrap_or_default();
                let port_groups = self.port.exec(&port).or_else(|| {
                    // The default port is also spelled as no port at all.
                    match tuple.uses_default_port() && !port.is_empty() {
                        true => self.port.exec(""),
                        false => None,
                    }
                })?;
                groups.extend(port_groups);
            },
        }
        Some(groups)
    }
}
