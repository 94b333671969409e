use serde::{Deserialize, Serialize};

use crate::context::AuthFlags;
use crate::errors::{AdsError, Result};

/// Source of client-side LDAP tuning, usually backed by the site configuration.
pub trait PolicySource {
    /// Wrap flags every new connection starts from.
    fn sasl_wrapping(&self) -> Result<AuthFlags>;
    /// Page size for paged searches on a new connection.
    fn ldap_page_size(&self) -> i32;
}

/// How a client protects its SASL-bound LDAP traffic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaslWrapping {
    Plain,
    Sign,
    #[default]
    Seal,
}

impl SaslWrapping {
    pub fn flags(self) -> AuthFlags {
        match self {
            SaslWrapping::Plain => AuthFlags::empty(),
            SaslWrapping::Sign => AuthFlags::SASL_SIGN,
            SaslWrapping::Seal => AuthFlags::SASL_SEAL,
        }
    }
}

/// Static policy, loadable from a JSON document such as
/// `{"client_ldap_sasl_wrapping": "sign", "ldap_page_size": 500}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Policy {
    pub client_ldap_sasl_wrapping: SaslWrapping,
    pub ldap_page_size: i32,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            client_ldap_sasl_wrapping: SaslWrapping::default(),
            ldap_page_size: 1000,
        }
    }
}

impl Policy {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| AdsError::Policy(e.to_string()))
    }
}

impl PolicySource for Policy {
    fn sasl_wrapping(&self) -> Result<AuthFlags> {
        Ok(self.client_ldap_sasl_wrapping.flags())
    }

    fn ldap_page_size(&self) -> i32 {
        self.ldap_page_size
    }
}
