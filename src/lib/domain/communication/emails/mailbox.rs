//! Mailbox

use std::fmt;

use crate::domain::communication::email_addresses::{EmailAddress, EmailAddressError};

/// An email address with the optional name of its owner
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Mailbox {
    name: Option<String>,
    address: EmailAddress,
}

impl Mailbox {
    /// Creates a mailbox. A blank name is treated as no name.
    pub fn new(name: Option<&str>, address: EmailAddress) -> Self {
        let name = name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(String::from);

        Self { name, address }
    }

    /// Parses `address` and creates a mailbox from it.
    pub fn parse(name: Option<&str>, address: &str) -> Result<Self, EmailAddressError> {
        Ok(Self::new(name, EmailAddress::new(address)?))
    }

    /// The name of the mailbox owner
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The address of the mailbox
    pub fn address(&self) -> &EmailAddress {
        &self.address
    }
}

impl From<EmailAddress> for Mailbox {
    fn from(address: EmailAddress) -> Self {
        Self {
            name: None,
            address,
        }
    }
}

impl fmt::Display for Mailbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "\"{}\" <{}>", name.replace('"', "\\\""), self.address),
            None => write!(f, "<{}>", self.address),
        }
    }
}
