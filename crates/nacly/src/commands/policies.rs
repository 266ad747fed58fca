//! Policy command handlers.

use tabled::Tabled;

use nacly_core::{JsonStore, Policy, PolicyCriteria, PolicyStore};

use crate::cli::{GlobalOpts, PoliciesArgs, PoliciesCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct PolicyRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "VLAN")]
    vlan: String,
    #[tabled(rename = "Criteria")]
    criteria: String,
}

impl From<&Policy> for PolicyRow {
    fn from(p: &Policy) -> Self {
        Self {
            name: p.name.clone(),
            vlan: p.vlan.to_string(),
            criteria: p.criteria_summary(),
        }
    }
}

fn detail(p: &Policy) -> String {
    [
        format!("Name:     {}", p.name),
        format!("VLAN:     {}", p.vlan),
        format!("Criteria: {}", p.criteria_summary()),
    ]
    .join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(store: &JsonStore, args: PoliciesArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        PoliciesCommand::List => {
            let policies = store.list_policies()?;
            let out = output::render_list(
                &global.output,
                &policies,
                |p| PolicyRow::from(p),
                |p| p.name.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        PoliciesCommand::Set {
            name,
            vlan,
            username,
            mac_prefix,
            default,
        } => {
            let name = name.trim().to_owned();
            if name.is_empty() {
                return Err(CliError::Validation {
                    field: "name".into(),
                    reason: "must not be empty".into(),
                });
            }
            let vlan = util::parse_vlan(vlan)?;
            let policy = match (username, mac_prefix) {
                (Some(user), _) => Policy::username(name, vlan, user),
                (None, Some(prefix)) => Policy::mac_prefix(name, vlan, &prefix)?,
                (None, None) if default => Policy::new(name, vlan, Some(PolicyCriteria::Default)),
                (None, None) => Policy::new(name, vlan, None),
            };

            let created = store.upsert_policy(policy.clone())?;
            let out = output::render_single(&global.output, &policy, detail, |p| p.name.clone())?;
            output::print_output(&out, global.quiet);
            let verb = if created { "created" } else { "updated" };
            output::print_status(&format!("Policy '{}' {verb}", policy.name), global.quiet);
            Ok(())
        }

        PoliciesCommand::Delete { name } => {
            if !util::confirm(&format!("Delete policy '{name}'?"), global.yes)? {
                return Ok(());
            }
            if !store.delete_policy(&name)? {
                return Err(CliError::NotFound {
                    resource_type: "policy".into(),
                    identifier: name,
                    list_command: "policies list".into(),
                });
            }
            output::print_status(&format!("Policy '{name}' deleted"), global.quiet);
            Ok(())
        }
    }
}
