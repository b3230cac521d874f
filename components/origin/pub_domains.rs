/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Implementation of public domain matching.
//!
//! The rules come from a file in the format of <https://publicsuffix.org/list/>: one rule
//! per line, `//` comments, `*.` wildcard rules and `!` exception rules. Domains that match
//! no rule fall back to the implicit `*` rule, i.e. their last label is the public suffix.
//!
//! Rules are stored in their ASCII form, the form canonical hosts are in.

use std::collections::HashSet;
use std::str::from_utf8;

use log::info;
use url::Host;

use crate::error::ConfigurationError;
use crate::resources::{Resource, ResourceReaderMethods};

#[derive(Clone, Debug, Default)]
pub struct PubDomainRules {
    rules: HashSet<String>,
    wildcards: HashSet<String>,
    exceptions: HashSet<String>,
}

impl PubDomainRules {
    /// Reads the rules named by [`Resource::DomainList`].
    pub fn load(reader: &dyn ResourceReaderMethods) -> Result<PubDomainRules, ConfigurationError> {
        let content = reader
            .read(Resource::DomainList)
            .map_err(|error| ConfigurationError::Unreadable(error.to_string()))?;
        let content = from_utf8(&content).map_err(|_| ConfigurationError::NotUtf8)?;
        let rules = PubDomainRules::parse(content)?;
        info!("Loaded {} public suffix rules", rules.len());
        Ok(rules)
    }

    pub fn parse(content: &str) -> Result<PubDomainRules, ConfigurationError> {
        let mut result = PubDomainRules::default();
        for (index, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with("//") {
                continue;
            }
            // Anything after the first whitespace is a comment.
            let Some(rule) = line.split_whitespace().next() else {
                continue;
            };
            result.add_rule(rule).map_err(|()| ConfigurationError::InvalidRule {
                line: index + 1,
                rule: rule.to_owned(),
            })?;
        }

        if result.is_empty() {
            return Err(ConfigurationError::Empty);
        }
        Ok(result)
    }

    fn add_rule(&mut self, rule: &str) -> Result<(), ()> {
        let (set, domain) = if let Some(domain) = rule.strip_prefix('!') {
            (&mut self.exceptions, domain)
        } else if let Some(domain) = rule.strip_prefix("*.") {
            (&mut self.wildcards, domain)
        } else {
            (&mut self.rules, rule)
        };

        if domain.is_empty() || domain.contains('*') || domain.split('.').any(str::is_empty) {
            return Err(());
        }
        match Host::parse(domain) {
            Ok(Host::Domain(domain)) => {
                set.insert(domain);
                Ok(())
            },
            _ => Err(()),
        }
    }

    pub fn len(&self) -> usize {
        self.rules.len() + self.wildcards.len() + self.exceptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Splits `domain` into its public suffix and the suffix that is one label longer.
    ///
    /// The second item equals the first when the domain is itself a public suffix.
    fn suffix_pair<'a>(&self, domain: &'a str) -> (&'a str, &'a str) {
        let mut suffix = domain;
        let mut prev_suffix = domain;
        // Suffixes are visited longest first, so the first rule that matches is the one the
        // algorithm prefers. Exceptions win over the wildcard they carve out of.
        for (index, _) in domain.match_indices('.') {
            let next_suffix = &domain[index + 1..];
            if self.exceptions.contains(suffix) {
                return (next_suffix, suffix);
            } else if self.wildcards.contains(next_suffix) || self.rules.contains(suffix) {
                return (suffix, prev_suffix);
            } else {
                prev_suffix = suffix;
                suffix = next_suffix;
            }
        }
        (suffix, prev_suffix)
    }

    /// The public suffix of a domain, e.g. `co.uk` for `www.example.co.uk`.
    pub fn public_suffix<'a>(&self, domain: &'a str) -> &'a str {
        self.suffix_pair(domain).0
    }

    pub fn is_public_suffix(&self, domain: &str) -> bool {
        self.public_suffix(domain) == domain
    }

    /// <https://url.spec.whatwg.org/#host-registrable-domain>
    ///
    /// IP addresses and hosts that are public suffixes have no registrable domain.
    pub fn registrable_domain(&self, host: &Host) -> Option<String> {
        let Host::Domain(domain) = host else {
            return None;
        };
        let (public_suffix, registrable) = self.suffix_pair(domain);
        if registrable == public_suffix {
            return None;
        }
        Some(registrable.to_owned())
    }
}
