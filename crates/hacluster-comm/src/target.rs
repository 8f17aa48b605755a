//! Node identities and their candidate addresses

use std::fmt;

use crate::error::{CommError, Result};

/// One network endpoint of a node
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeAddress {
    pub host: String,
    pub port: u16,
}

impl NodeAddress {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Full URL of `action` on this address
    #[must_use]
    pub fn url_for(&self, action: &str) -> String {
        format!("https://{self}/{action}")
    }
}

impl fmt::Display for NodeAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

/// Position in a target's address list
///
/// Retrying is a pure function of the target and a cursor, so one `Target`
/// can be shared read-only by any number of commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AddressCursor(usize);

impl AddressCursor {
    /// Cursor pointing at the preferred address
    #[must_use]
    pub fn start() -> Self {
        Self(0)
    }
}

/// A cluster node plus its ordered, non-empty list of addresses
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    label: String,
    address_list: Vec<NodeAddress>,
}

impl Target {
    /// Create a target; the first address is preferred, the rest are fallbacks
    ///
    /// # Errors
    /// Returns `CommError::EmptyAddressList` if `address_list` is empty.
    pub fn new(label: impl Into<String>, address_list: Vec<NodeAddress>) -> Result<Self> {
        let label = label.into();
        if address_list.is_empty() {
            return Err(CommError::EmptyAddressList(label));
        }
        Ok(Self {
            label,
            address_list,
        })
    }

    /// Create a target whose addresses all share `port`
    ///
    /// # Errors
    /// Returns `CommError::EmptyAddressList` if `hosts` is empty.
    pub fn from_hosts<S: AsRef<str>>(
        label: impl Into<String>,
        hosts: &[S],
        port: u16,
    ) -> Result<Self> {
        let address_list = hosts
            .iter()
            .map(|host| NodeAddress::new(host.as_ref(), port))
            .collect();
        Self::new(label, address_list)
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn address_list(&self) -> &[NodeAddress] {
        &self.address_list
    }

    /// Address at `cursor` and the cursor for the one after it
    #[must_use]
    pub fn next_address(&self, cursor: AddressCursor) -> Option<(&NodeAddress, AddressCursor)> {
        self.address_list
            .get(cursor.0)
            .map(|address| (address, AddressCursor(cursor.0 + 1)))
    }
}
