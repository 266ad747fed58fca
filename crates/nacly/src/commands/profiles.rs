//! VLAN profile command handlers.

use tabled::Tabled;

use nacly_core::store::seed;
use nacly_core::{JsonStore, VlanProfile};

use crate::cli::{GlobalOpts, ProfilesArgs, ProfilesCommand};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct ProfileRow {
    #[tabled(rename = "Username")]
    username: String,
    #[tabled(rename = "VLAN")]
    vlan: String,
}

impl From<&VlanProfile> for ProfileRow {
    fn from(p: &VlanProfile) -> Self {
        Self {
            username: p.username.clone(),
            vlan: p.vlan.to_string(),
        }
    }
}

pub fn handle(store: &JsonStore, args: ProfilesArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ProfilesCommand::List => {
            let profiles = store.list_profiles()?;
            let out = output::render_list(
                &global.output,
                &profiles,
                |p| ProfileRow::from(p),
                |p| format!("{}={}", p.username, p.vlan),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ProfilesCommand::Set { username, vlan } => {
            let vlan = util::parse_vlan(vlan)?;
            store.set_profile(&username, vlan)?;
            output::print_status(&format!("Profile {username} -> VLAN {vlan}"), global.quiet);
            Ok(())
        }

        ProfilesCommand::Remove { username } => {
            if !store.remove_profile(&username)? {
                return Err(CliError::NotFound {
                    resource_type: "profile".into(),
                    identifier: username,
                    list_command: "profiles list".into(),
                });
            }
            output::print_status(&format!("Profile {username} removed"), global.quiet);
            Ok(())
        }

        ProfilesCommand::Import { file } => {
            let contents = util::read_text_file(&file)?;
            let profiles = seed::parse_profile_seed(&contents)?;
            let report = store.import_profiles(profiles)?;
            let out = output::render_single(
                &global.output,
                &report,
                |r| format!("Inserted: {}\nSkipped:  {}", r.inserted, r.skipped),
                |r| r.inserted.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
