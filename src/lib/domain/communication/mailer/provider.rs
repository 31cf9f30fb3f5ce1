//! Email providers

use std::{fmt, str::FromStr};

use serde::Serialize;
use thiserror::Error;

/// An error that can occur when parsing a provider name
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("unknown provider \"{0}\", expected one of: sendgrid, gmail, smtp")]
pub struct UnknownProviderError(pub String);

/// A backend able to deliver email
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// SendGrid's transactional mail API
    SendGrid,

    /// Gmail's webmail API
    Gmail,

    /// A plain SMTP relay
    Smtp,
}

impl Provider {
    /// The provider's configuration name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SendGrid => "sendgrid",
            Self::Gmail => "gmail",
            Self::Smtp => "smtp",
        }
    }
}

impl FromStr for Provider {
    type Err = UnknownProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sendgrid" => Ok(Self::SendGrid),
            "gmail" => Ok(Self::Gmail),
            "smtp" => Ok(Self::Smtp),
            _ => Err(UnknownProviderError(s.to_string())),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
