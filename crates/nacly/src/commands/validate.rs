//! `nacly validate` — run one decision through the engine.

use std::sync::Arc;

use nacly_core::{Decision, JsonStore};

use crate::cli::{GlobalOpts, ValidateArgs};
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;

use super::util::or_dash;

fn detail(d: &Decision, color: bool) -> String {
    [
        format!("MAC:      {}", d.mac),
        format!("Username: {}", d.username.as_deref().unwrap_or("-")),
        format!("Access:   {}", output::access_label(d.state(), color)),
        format!("VLAN:     {}", or_dash(d.vlan)),
    ]
    .join("\n")
}

/// Plain output: the VLAN when admitted, `blocked` otherwise.
fn plain(d: &Decision) -> String {
    d.vlan.map_or_else(|| "blocked".into(), |v| v.to_string())
}

pub async fn handle(
    store: JsonStore,
    cfg: &Config,
    args: ValidateArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let plane = config::build_control_plane(cfg, Arc::new(store))?;
    let decision = plane.validate_and_program(&args.mac).await?;

    let color = output::should_color(&global.color);
    let out = output::render_single(&global.output, &decision, |d| detail(d, color), plain)?;
    output::print_output(&out, global.quiet);
    Ok(())
}
