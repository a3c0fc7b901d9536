//! `slipway ls` command

use std::path::PathBuf;

use anyhow::Result;

use crate::cli::LsArgs;
use crate::commands::load_workspace;

pub fn execute(dir: &Option<PathBuf>, args: LsArgs) -> Result<()> {
    let ws = load_workspace(dir)?;
    let default_toolchain = ws.default_toolchain();

    for target in ws.graph().targets() {
        let name = target
            .label()
            .user_visible_name_with_default(default_toolchain);
        if let Some(prefix) = &args.prefix {
            if !name.starts_with(prefix.as_str()) {
                continue;
            }
        }
        println!("{name}");
    }
    Ok(())
}
