//! Organization / group / user table
//!
//! For each organization: every group that has a mail address, followed by
//! the group's users sorted by email.
//!
//! ```text
//! ╒═══════════════════════════════════════════════════════════════════╕
//! │                 Organisation ID: 7 (name: "Example")              │
//! ├───────────────────────────────────────────────────────────────────┤
//! │ admins@example.ru (Admins)                                        │
//! ├───────────────────────────────┬─────────────────┬─────────────────┤
//! │ anna@example.ru               │ Anna            │ Ivanova         │
//! ╘═══════════════════════════════╧═════════════════╧═════════════════╛
//! ```

use std::fmt::{self, Write};

use directory::{Directory, Group, HttpTransport, Organization, Parameters, User};
use tracing::debug;

use crate::error::{Error, Result};

/// Page size for group and user listings; one page covers a whole org.
const PER_PAGE: &str = "1000";

const TOP: &str = "╒═══════════════════════════════════════════════════════════════════╕";
const RULE: &str = "├───────────────────────────────────────────────────────────────────┤";
const COLUMNS_OPEN: &str = "├───────────────────────────────┬─────────────────┬─────────────────┤";
const COLUMNS_CLOSE: &str = "├───────────────────────────────┴─────────────────┴─────────────────┤";
const BOTTOM: &str = "╘═══════════════════════════════╧═════════════════╧═════════════════╛";

/// Fetch the directory and render the table.
///
/// `org_id > 0` restricts the report to that organization; an id the token
/// cannot see yields an empty report.
pub async fn render<C: HttpTransport>(directory: &Directory<C>, org_id: i64) -> Result<String> {
    let mut organizations = directory
        .get_organizations(None)
        .await
        .map_err(Error::fetch("get organizations"))?
        .result;

    if org_id > 0 {
        organizations.retain(|org| org.id == org_id);
    }

    let mut out = String::new();
    for org in &organizations {
        let groups = directory
            .get_groups(
                org.id,
                Some(&Parameters::fields(["id", "name", "email"]).with("per_page", [PER_PAGE])),
            )
            .await
            .map_err(Error::fetch("get groups"))?
            .result;

        let mut sections = Vec::new();
        for group in groups.into_iter().filter(|g| !g.email.is_empty()) {
            let params = Parameters::fields(["name", "email"])
                .with("group_id", [group.id.to_string()])
                .with("per_page", [PER_PAGE]);
            let mut users = directory
                .get_users(org.id, Some(&params))
                .await
                .map_err(Error::fetch("get users"))?
                .result;
            users.sort_by(|a, b| a.email.cmp(&b.email));
            sections.push((group, users));
        }

        debug!(org_id = org.id, groups = sections.len(), "rendering organization");
        write_organization(&mut out, org, &sections)?;
    }

    Ok(out)
}

fn write_organization<W: Write>(
    out: &mut W,
    org: &Organization,
    sections: &[(Group, Vec<User>)],
) -> fmt::Result {
    let title = format!("Organisation ID: {} (name: \"{}\")", org.id, org.name);

    writeln!(out, "{TOP}")?;
    writeln!(out, "│{title:^67}│")?;

    for (n, (group, users)) in sections.iter().enumerate() {
        if n == 0 {
            writeln!(out, "{RULE}")?;
        }
        let heading = format!("{} ({})", group.email, group.name);
        writeln!(out, "│ {heading:<65} │")?;
        writeln!(out, "{COLUMNS_OPEN}")?;

        for user in users {
            let (first, last) = user
                .name
                .as_ref()
                .map(|name| (name.first.as_str(), name.last.as_str()))
                .unwrap_or_default();
            writeln!(out, "│ {:<29} │ {:<15} │ {:<15} │", user.email, first, last)?;
        }

        if n + 1 != sections.len() {
            writeln!(out, "{COLUMNS_CLOSE}")?;
        }
    }

    writeln!(out, "{BOTTOM}")
}
