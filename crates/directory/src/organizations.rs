//! Organizations visible to the token owner

use serde::{Deserialize, Serialize};
use serde_json::Value;
use transport::{HeaderSet, HttpTransport, Parameters};

use crate::Directory;
use crate::error::Result;
use crate::types::is_zero;

/// Organization list. `links` is kept untyped; this endpoint does not use the
/// paging envelope of the other lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrganizationList {
    pub links: Value,
    pub result: Vec<Organization>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Organization {
    /// Signed so it can be passed straight to the org-scoped calls.
    pub id: i64,
    #[serde(skip_serializing_if = "is_zero")]
    pub revision: u64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub label: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domains: Option<OrganizationDomains>,
    #[serde(skip_serializing_if = "is_zero")]
    pub admin_uid: u64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub email: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub services: Vec<OrganizationService>,
    #[serde(skip_serializing_if = "is_zero")]
    pub disk_limit: u64,
    #[serde(skip_serializing_if = "is_zero")]
    pub disk_usage: u64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub subscription_plan: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub country: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub language: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub fax: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub phone_number: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrganizationDomains {
    pub display: String,
    pub master: String,
    pub all: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrganizationService {
    pub slug: String,
    pub ready: bool,
}

impl Organization {
    pub const ALL_FIELDS: &'static [&'static str] = &[
        "revision",
        "id",
        "label",
        "domains",
        "admin_uid",
        "email",
        "services",
        "disk_limit",
        "subscription_plan",
        "country",
        "language",
        "name",
        "fax",
        "disk_usage",
        "phone_number",
    ];

    pub fn all_fields() -> Parameters {
        Parameters::fields(Self::ALL_FIELDS.iter().copied())
    }
}

impl<C: HttpTransport> Directory<C> {
    /// Every organization the token can see. Not org-scoped, so no
    /// `X-Org-ID` header is sent.
    pub async fn get_organizations(&self, params: Option<&Parameters>) -> Result<OrganizationList> {
        let organizations =
            transport::get(&self.client, &self.url("organizations/"), params, HeaderSet::new())
                .await?;
        Ok(organizations)
    }
}
