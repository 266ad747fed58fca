//! Config subcommand handlers.

use std::fmt::Write as _;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;

/// Format the effective config as TOML-ish text, resolving defaults.
fn format_effective(cfg: &Config) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "[engine]");
    let _ = writeln!(out, "driver = \"{}\"", cfg.engine.driver);
    let _ = writeln!(out, "command_timeout_secs = {}", cfg.engine.command_timeout_secs);
    let _ = writeln!(
        out,
        "firewall_binary = \"{}\"",
        cfg.engine.firewall_binary.display()
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "[storage]");
    let _ = writeln!(out, "data_dir = \"{}\"", cfg.data_dir().display());
    let _ = write!(out, "log_file = \"{}\"", cfg.log_file().display());
    out
}

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: write defaults ────────────────────────────────────
        ConfigCommand::Init => {
            let path = config::config_path(global);
            if path.exists() && !global.yes {
                return Err(CliError::Conflict {
                    resource_type: "config file".into(),
                    identifier: path.display().to_string(),
                });
            }
            config::save_config_to(&Config::default(), &path)?;
            output::print_status(
                &format!("✓ Configuration written to {}", path.display()),
                global.quiet,
            );
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = config::load(global)?;
            let out = output::render_single(&global.output, &cfg, format_effective, |c| {
                c.data_dir().display().to_string()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            output::print_output(&config::config_path(global).display().to_string(), false);
            Ok(())
        }
    }
}
