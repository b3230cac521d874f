/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Structured [origins](https://html.spec.whatwg.org/multipage/#origin) for code that only
//! ever sees their text serialization.
//!
//! Serialized origins are parsed strictly: anything that is not already the exact, canonical
//! `scheme://host[:port]` serialization (or `null`) is rejected instead of being repaired.
//! Parsed origins can be compared for same-origin and same-site equivalence, and matched
//! against restricted URL patterns that only describe a protocol, a hostname and a port.

#![deny(unsafe_code)]

pub mod error;
pub mod host;
pub mod origin;
pub mod pub_domains;
pub mod resources;
pub mod site;
pub mod urlpattern;

pub use url::Host;

pub use crate::error::{ConfigurationError, SpecificationError, ValidationError};
pub use crate::origin::{OpaqueOrigin, Origin, TupleOrigin};
pub use crate::pub_domains::PubDomainRules;
pub use crate::resources::{Resource, ResourceDirectory, ResourceReaderMethods};
pub use crate::site::SiteResolver;
pub use crate::urlpattern::{OriginPattern, OriginPatternInit, OriginPatternInput};

/// The longest serialized origin or origin pattern, in bytes, that will be looked at.
///
/// Longer inputs are rejected up front so that parsing and matching stay bounded.
pub const MAX_INPUT_LENGTH: usize = 2048;
