//! Shapes shared by several resources

use serde::{Deserialize, Serialize};

/// `{"id": N}` reference to another directory object.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdRef {
    pub id: u64,
}

impl From<u64> for IdRef {
    fn from(id: u64) -> Self {
        Self { id }
    }
}

/// Navigation links of a list response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Links {
    pub next: String,
    pub prev: String,
    pub last: String,
    pub first: String,
}

/// One page of a list endpoint. Only the requested page is returned; the
/// client does not walk `links`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    #[serde(default)]
    pub page: u64,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub per_page: u64,
    #[serde(default)]
    pub pages: u64,
    #[serde(default)]
    pub result: Vec<T>,
    #[serde(default)]
    pub links: Links,
}

pub(crate) fn is_zero(value: &u64) -> bool {
    *value == 0
}

pub(crate) fn is_false(value: &bool) -> bool {
    !*value
}
