/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::sync::Arc;

use log::error;
use url::Host;

use crate::error::ConfigurationError;
use crate::origin::Origin;
use crate::pub_domains::PubDomainRules;
use crate::resources::ResourceReaderMethods;

/// Answers registrable-domain and same-site questions from a shared public suffix table.
///
/// The table is never mutated once loaded, so one handle can be cloned into every place that
/// needs it. A resolver whose table failed to load keeps the error and returns it from every
/// query instead of answering.
#[derive(Clone, Debug)]
pub struct SiteResolver {
    rules: Result<Arc<PubDomainRules>, ConfigurationError>,
}

impl SiteResolver {
    pub fn new(rules: Arc<PubDomainRules>) -> SiteResolver {
        SiteResolver { rules: Ok(rules) }
    }

    pub fn from_resources(reader: &dyn ResourceReaderMethods) -> SiteResolver {
        let rules = PubDomainRules::load(reader).map(Arc::new);
        if let Err(ref err) = rules {
            error!("Same-site checks are unavailable: {err}");
        }
        SiteResolver { rules }
    }

    pub fn rules(&self) -> Result<&Arc<PubDomainRules>, ConfigurationError> {
        self.rules.as_ref().map_err(Clone::clone)
    }

    pub fn registrable_domain(&self, host: &Host) -> Result<Option<String>, ConfigurationError> {
        Ok(self.rules()?.registrable_domain(host))
    }

    /// <https://html.spec.whatwg.org/multipage/#same-site>
    ///
    /// Opaque origins are only same-site with themselves. Tuple origins are same-site when
    /// their schemes match and their hosts share a registrable domain, or are the same host
    /// and have none.
    pub fn is_same_site(&self, a: &Origin, b: &Origin) -> Result<bool, ConfigurationError> {
        let (Origin::Tuple(a), Origin::Tuple(b)) = (a, b) else {
            return Ok(a.is_same_origin(b));
        };
        if a.scheme() != b.scheme() {
            return Ok(false);
        }

        let rules = self.rules()?;
        Ok(
            match (
                rules.registrable_domain(a.host()),
                rules.registrable_domain(b.host()),
            ) {
                (Some(a), Some(b)) => a == b,
                (None, None) => a.host() == b.host(),
                _ => false,
            },
        )
    }
}
