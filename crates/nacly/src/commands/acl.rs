//! ACL command handlers.

use std::fmt::Write as _;

use owo_colors::OwoColorize;

use nacly_core::{AclReport, validate_acls};

use crate::cli::{AclArgs, AclCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

fn detail(report: &AclReport, color: bool) -> String {
    let mut out = String::new();
    for rule in &report.rules {
        let port = rule.port.map(|p| format!(" eq {p}")).unwrap_or_default();
        let _ = write!(
            out,
            "{} {} {} {}{port}",
            rule.action, rule.protocol, rule.src, rule.dst
        );
        if let Some(ref desc) = rule.description {
            let _ = write!(out, "  # {desc}");
        }
        out.push('\n');
    }
    for issue in &report.issues {
        if color {
            let _ = writeln!(out, "{}", issue.red());
        } else {
            let _ = writeln!(out, "{issue}");
        }
    }
    let _ = write!(
        out,
        "{} valid, {} invalid",
        report.rules.len(),
        report.issues.len()
    );
    out
}

pub fn handle(args: AclArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        AclCommand::Validate { file } => {
            let payload = util::read_json_file(&file)?;
            let report = validate_acls(&payload);

            let color = output::should_color(&global.color);
            let out = output::render_single(
                &global.output,
                &report,
                |r| detail(r, color),
                |r| {
                    r.rules
                        .iter()
                        .map(|rule| rule.raw.clone())
                        .collect::<Vec<_>>()
                        .join("\n")
                },
            )?;
            output::print_output(&out, global.quiet);

            if report.ok {
                Ok(())
            } else {
                Err(CliError::AclInvalid {
                    count: report.issues.len(),
                })
            }
        }
    }
}
