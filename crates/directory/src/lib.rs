//! Typed client for the Yandex directory API (v6)
//!
//! `Directory` wraps any `HttpTransport` and exposes one method per API
//! operation. Each method only picks the path, the call shape and the
//! organization header; all HTTP semantics live in the transport crate.
//!
//! Calls are scoped to an organization through the `X-Org-ID` header. An
//! org id of zero or below sends no header, which makes the API fall back
//! to the token owner's default organization.

pub mod departments;
pub mod domains;
pub mod error;
pub mod groups;
pub mod organizations;
pub mod types;
pub mod users;

pub use departments::{Department, DepartmentParent, NewDepartment};
pub use domains::Domain;
pub use error::{Error, Result};
pub use groups::{Group, GroupMember, GroupMemberRef, GroupUser, NewGroup};
pub use organizations::{Organization, OrganizationDomains, OrganizationList, OrganizationService};
pub use types::{IdRef, Links, Page};
pub use users::{Contact, User, UserName};

pub use transport::{HeaderSet, HttpTransport, Parameters};

use serde::Serialize;

/// Root of the directory API
pub const DIRECTORY_API: &str = "https://api.directory.yandex.net/";

/// API version all paths are served under
pub const API_VERSION: &str = "v6";

/// Organization scoping header
pub const ORG_HEADER: &str = "X-Org-ID";

/// Directory API client over an injected HTTP transport.
pub struct Directory<C> {
    client: C,
    base_url: String,
}

impl<C: HttpTransport> Directory<C> {
    pub fn new(client: C) -> Self {
        Self::with_base_url(client, format!("{DIRECTORY_API}{API_VERSION}"))
    }

    /// Point at another API root, e.g. a local stub in tests.
    pub fn with_base_url(client: C, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

/// `X-Org-ID` header for `org_id`, or no header when `org_id <= 0`.
pub fn org_header(org_id: i64) -> HeaderSet {
    let mut headers = HeaderSet::new();
    if org_id > 0 {
        headers.insert(ORG_HEADER.to_string(), org_id.to_string());
    }
    headers
}

/// Org header plus the JSON content type for calls that send a body.
pub(crate) fn json_headers(org_id: i64) -> HeaderSet {
    let mut headers = org_header(org_id);
    headers.insert("Content-Type".to_string(), "application/json".to_string());
    headers
}

pub(crate) fn to_body<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| Error::Encode(e.to_string()))
}
