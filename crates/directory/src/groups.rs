//! Groups
//!
//! Reads return members as `{"type": .., "object": {..}}`; writes take the
//! flat `{"type": .., "id": ..}` form.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use transport::{HttpTransport, Parameters};

use crate::error::Result;
use crate::types::{IdRef, Page, is_false, is_zero};
use crate::users::{Contact, UserName};
use crate::{Directory, json_headers, org_header, to_body};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Group {
    #[serde(skip_serializing_if = "is_zero")]
    pub id: u64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub email: String,
    #[serde(skip_serializing_if = "Value::is_null")]
    pub external_id: Value,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<GroupMember>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub label: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub created: String,
    /// `generic` for user-made groups, other values for system groups
    #[serde(rename = "type", skip_serializing_if = "String::is_empty")]
    pub kind: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub admins: Vec<GroupUser>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<GroupUser>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "is_zero")]
    pub members_count: u64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub member_of: Vec<u64>,
}

/// Member entry as returned by reads. Only the id of the member object is
/// kept, since its shape depends on `kind`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupMember {
    /// `user`, `group` or `department`
    #[serde(rename = "type")]
    pub kind: String,
    pub object: IdRef,
}

/// Member entry for create and modify requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMemberRef {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: u64,
}

impl GroupMemberRef {
    pub fn user(id: u64) -> Self {
        Self {
            kind: "user".into(),
            id,
        }
    }

    pub fn group(id: u64) -> Self {
        Self {
            kind: "group".into(),
            id,
        }
    }

    pub fn department(id: u64) -> Self {
        Self {
            kind: "department".into(),
            id,
        }
    }
}

/// User summary embedded in a group (admins, author).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupUser {
    pub id: u64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    #[serde(rename = "type", skip_serializing_if = "String::is_empty")]
    pub kind: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub nickname: String,
    #[serde(skip_serializing_if = "is_zero")]
    pub department_id: u64,
    #[serde(skip_serializing_if = "is_false")]
    pub is_dismissed: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub position: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<IdRef>,
    #[serde(skip_serializing_if = "is_false")]
    pub is_admin: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub birthday: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub email: String,
    #[serde(skip_serializing_if = "Value::is_null")]
    pub external_id: Value,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub gender: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub contacts: Vec<Contact>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<UserName>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub about: String,
}

/// Body for creating or modifying a group. `name` is always sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NewGroup {
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub label: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<GroupMemberRef>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub admins: Vec<IdRef>,
}

impl Group {
    pub const ALL_FIELDS: &'static [&'static str] = &[
        "name",
        "email",
        "external_id",
        "id",
        "members",
        "label",
        "created",
        "type",
        "admins",
        "author",
        "description",
        "members_count",
        "member_of",
    ];

    pub fn all_fields() -> Parameters {
        Parameters::fields(Self::ALL_FIELDS.iter().copied())
    }
}

impl<C: HttpTransport> Directory<C> {
    pub async fn get_groups(&self, org_id: i64, params: Option<&Parameters>) -> Result<Page<Group>> {
        let groups =
            transport::get(&self.client, &self.url("groups/"), params, org_header(org_id)).await?;
        Ok(groups)
    }

    pub async fn get_group(&self, org_id: i64, group_id: u64, params: Option<&Parameters>) -> Result<Group> {
        let group = transport::get(
            &self.client,
            &self.url(&format!("groups/{group_id}/")),
            params,
            org_header(org_id),
        )
        .await?;
        Ok(group)
    }

    pub async fn create_group(&self, org_id: i64, group: &NewGroup) -> Result<Group> {
        let created = transport::post(
            &self.client,
            &self.url("groups/"),
            None,
            json_headers(org_id),
            to_body(group)?,
        )
        .await?;
        Ok(created)
    }

    pub async fn modify_group(&self, org_id: i64, group_id: u64, changes: &NewGroup) -> Result<Group> {
        let updated = transport::patch(
            &self.client,
            &self.url(&format!("groups/{group_id}/")),
            None,
            json_headers(org_id),
            to_body(changes)?,
        )
        .await?;
        Ok(updated)
    }

    pub async fn delete_group(&self, org_id: i64, group_id: u64) -> Result<()> {
        transport::delete(
            &self.client,
            &self.url(&format!("groups/{group_id}/")),
            None,
            org_header(org_id),
        )
        .await?;
        Ok(())
    }
}
