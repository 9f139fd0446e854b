//! Domains

use serde::{Deserialize, Serialize};
use transport::{HttpTransport, Parameters};

use crate::error::Result;
use crate::{Directory, org_header};

/// Domain attached to an organization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Domain {
    pub name: String,
    pub country: String,
    pub mx: bool,
    pub delegated: bool,
    pub tech: bool,
    pub master: bool,
    pub owned: bool,
    pub pop_enabled: bool,
    pub imap_enabled: bool,
    pub postmaster_uid: u64,
}

impl Domain {
    pub const ALL_FIELDS: &'static [&'static str] = &[
        "mx",
        "delegated",
        "tech",
        "pop_enabled",
        "master",
        "postmaster_uid",
        "owned",
        "country",
        "name",
        "imap_enabled",
    ];

    pub fn all_fields() -> Parameters {
        Parameters::fields(Self::ALL_FIELDS.iter().copied())
    }
}

impl<C: HttpTransport> Directory<C> {
    /// Domains of the organization. Unlike the other lists this endpoint
    /// returns a bare JSON array, not a page.
    pub async fn get_domains(&self, org_id: i64, params: Option<&Parameters>) -> Result<Vec<Domain>> {
        let domains =
            transport::get(&self.client, &self.url("domains/"), params, org_header(org_id)).await?;
        Ok(domains)
    }
}
