//! Departments

use serde::{Deserialize, Serialize};
use serde_json::Value;
use transport::{HttpTransport, Parameters};

use crate::error::Result;
use crate::types::{IdRef, Page, is_false, is_zero};
use crate::{Directory, json_headers, org_header, to_body};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Department {
    #[serde(skip_serializing_if = "is_zero")]
    pub id: u64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub email: String,
    #[serde(skip_serializing_if = "Value::is_null")]
    pub external_id: Value,
    #[serde(skip_serializing_if = "is_false")]
    pub removed: bool,
    /// Ancestors, root first
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parents: Vec<DepartmentParent>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub label: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub created: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<DepartmentParent>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "is_zero")]
    pub members_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head: Option<IdRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DepartmentParent {
    pub id: u64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub email: String,
    #[serde(skip_serializing_if = "Value::is_null")]
    pub external_id: Value,
    #[serde(skip_serializing_if = "is_false")]
    pub removed: bool,
    #[serde(skip_serializing_if = "is_zero")]
    pub parent_id: u64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub label: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub created: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "is_zero")]
    pub members_count: u64,
}

/// Body for creating or modifying a department. `name` is always sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NewDepartment {
    pub name: String,
    #[serde(skip_serializing_if = "is_zero")]
    pub parent_id: u64,
    #[serde(skip_serializing_if = "is_zero")]
    pub head_id: u64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub label: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
}

impl Department {
    pub const ALL_FIELDS: &'static [&'static str] = &[
        "name",
        "email",
        "external_id",
        "removed",
        "id",
        "parents",
        "label",
        "created",
        "parent",
        "description",
        "members_count",
        "head",
    ];

    pub fn all_fields() -> Parameters {
        Parameters::fields(Self::ALL_FIELDS.iter().copied())
    }
}

impl<C: HttpTransport> Directory<C> {
    pub async fn get_departments(
        &self,
        org_id: i64,
        params: Option<&Parameters>,
    ) -> Result<Page<Department>> {
        let departments =
            transport::get(&self.client, &self.url("departments/"), params, org_header(org_id))
                .await?;
        Ok(departments)
    }

    pub async fn get_department(
        &self,
        org_id: i64,
        department_id: u64,
        params: Option<&Parameters>,
    ) -> Result<Department> {
        let department = transport::get(
            &self.client,
            &self.url(&format!("departments/{department_id}/")),
            params,
            org_header(org_id),
        )
        .await?;
        Ok(department)
    }

    pub async fn create_department(&self, org_id: i64, department: &NewDepartment) -> Result<Department> {
        let created = transport::post(
            &self.client,
            &self.url("departments/"),
            None,
            json_headers(org_id),
            to_body(department)?,
        )
        .await?;
        Ok(created)
    }

    pub async fn modify_department(
        &self,
        org_id: i64,
        department_id: u64,
        changes: &NewDepartment,
    ) -> Result<Department> {
        let updated = transport::patch(
            &self.client,
            &self.url(&format!("departments/{department_id}/")),
            None,
            json_headers(org_id),
            to_body(changes)?,
        )
        .await?;
        Ok(updated)
    }

    pub async fn delete_department(&self, org_id: i64, department_id: u64) -> Result<()> {
        transport::delete(
            &self.client,
            &self.url(&format!("departments/{department_id}/")),
            None,
            org_header(org_id),
        )
        .await?;
        Ok(())
    }
}
