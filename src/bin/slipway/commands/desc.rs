//! `slipway desc` command

use std::path::PathBuf;

use anyhow::Result;

use crate::cli::DescArgs;
use crate::commands::load_workspace;
use slipway::ops::run_desc;
use slipway::ResolvedTargetData;

pub fn execute(dir: &Option<PathBuf>, args: DescArgs) -> Result<()> {
    let ws = load_workspace(dir)?;
    let data = ResolvedTargetData::new(ws.graph());

    let mut desc_args = vec![args.label];
    if let Some(section) = args.section {
        desc_args.push(section);
    }
    run_desc(&desc_args, &ws, &data)
}
