/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Environment variable naming the directory [`ResourceDirectory::from_env`] reads from.
pub const RESOURCES_PATH_VARIABLE: &str = "SERVO_ORIGIN_RESOURCES";

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Resource {
    /// A list of domain names that are considered public suffixes, typically obtained from
    /// <https://publicsuffix.org/list/>. Registrable domains, and with them same-site checks,
    /// are computed from it. It must contain at least one rule.
    DomainList,
}

impl Resource {
    pub fn filename(&self) -> &'static str {
        match self {
            Resource::DomainList => "public_suffix_list.dat",
        }
    }
}

/// Supplies the bytes of a [`Resource`]. Implemented by embedders that ship their data some
/// other way than as files.
pub trait ResourceReaderMethods {
    fn read(&self, resource: Resource) -> io::Result<Vec<u8>>;
}

/// Reads resources from files in a directory.
#[derive(Clone, Debug)]
pub struct ResourceDirectory {
    path: PathBuf,
}

impl ResourceDirectory {
    pub fn new(path: impl Into<PathBuf>) -> ResourceDirectory {
        ResourceDirectory { path: path.into() }
    }

    /// Uses the directory named by [`RESOURCES_PATH_VARIABLE`], if it is set.
    pub fn from_env() -> Option<ResourceDirectory> {
        env::var_os(RESOURCES_PATH_VARIABLE).map(ResourceDirectory::new)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ResourceReaderMethods for ResourceDirectory {
    fn read(&self, resource: Resource) -> io::Result<Vec<u8>> {
        fs::read(self.path.join(resource.filename()))
    }
}
