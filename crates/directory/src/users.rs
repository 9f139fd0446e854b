//! Users

use serde::{Deserialize, Serialize};
use serde_json::Value;
use transport::{ApiRequest, HttpTransport, Parameters};

use crate::error::Result;
use crate::types::{IdRef, Page, is_false, is_zero};
use crate::{Directory, json_headers, org_header, to_body};

/// Directory user. Empty fields are left out when sending, so the same type
/// serves as a full record, a create request and a partial update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    #[serde(skip_serializing_if = "is_zero")]
    pub id: u64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub nickname: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<UserName>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub position: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub about: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub gender: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub birthday: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub created: String,
    /// Free-form identifier from an external system; any JSON value
    #[serde(skip_serializing_if = "Value::is_null")]
    pub external_id: Value,
    #[serde(skip_serializing_if = "is_zero")]
    pub org_id: u64,
    #[serde(skip_serializing_if = "is_zero")]
    pub department_id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<IdRef>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub departments: Vec<IdRef>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<IdRef>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub contacts: Vec<Contact>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    #[serde(skip_serializing_if = "is_false")]
    pub is_robot: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub is_admin: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub is_dismissed: bool,
    /// Write-only, set on create or password change
    #[serde(skip_serializing_if = "String::is_empty")]
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_change_required: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserName {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub first: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub last: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub middle: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Contact {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub value: String,
    #[serde(rename = "type", skip_serializing_if = "String::is_empty")]
    pub kind: String,
    #[serde(skip_serializing_if = "is_false")]
    pub main: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub alias: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub synthetic: bool,
}

impl User {
    /// Every readable user field.
    pub const ALL_FIELDS: &'static [&'static str] = &[
        "is_robot",
        "external_id",
        "departments",
        "org_id",
        "gender",
        "created",
        "name",
        "about",
        "nickname",
        "groups",
        "is_admin",
        "birthday",
        "department_id",
        "email",
        "department",
        "contacts",
        "aliases",
        "id",
        "is_dismissed",
    ];

    pub fn all_fields() -> Parameters {
        Parameters::fields(Self::ALL_FIELDS.iter().copied())
    }
}

impl<C: HttpTransport> Directory<C> {
    pub async fn get_users(&self, org_id: i64, params: Option<&Parameters>) -> Result<Page<User>> {
        let users = transport::get(&self.client, &self.url("users/"), params, org_header(org_id)).await?;
        Ok(users)
    }

    pub async fn get_user(&self, org_id: i64, user_id: u64, params: Option<&Parameters>) -> Result<User> {
        let user = transport::get(
            &self.client,
            &self.url(&format!("users/{user_id}/")),
            params,
            org_header(org_id),
        )
        .await?;
        Ok(user)
    }

    /// Create a user and return it as stored, with its assigned id.
    pub async fn create_user(&self, org_id: i64, user: &User) -> Result<User> {
        let created = transport::post(
            &self.client,
            &self.url("users/"),
            None,
            json_headers(org_id),
            to_body(user)?,
        )
        .await?;
        Ok(created)
    }

    /// Apply the non-empty fields of `changes` to the user.
    pub async fn modify_user(&self, org_id: i64, user_id: u64, changes: &User) -> Result<User> {
        let updated = transport::patch(
            &self.client,
            &self.url(&format!("users/{user_id}/")),
            None,
            json_headers(org_id),
            to_body(changes)?,
        )
        .await?;
        Ok(updated)
    }

    /// Add an email alias (local part only) to the user.
    pub async fn add_alias_user(&self, org_id: i64, user_id: u64, alias: &str) -> Result<()> {
        let request = ApiRequest::post(
            self.url(&format!("users/{user_id}/aliases/")),
            to_body(&serde_json::json!({ "name": alias }))?,
        )
        .headers(json_headers(org_id));
        transport::execute(&self.client, request).await?;
        Ok(())
    }
}
