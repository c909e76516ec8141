//! Filepath: src/core/tree.rs
//! The `tree` command: preview the selected-files structure for a
//! repository without fetching any file content.

use anyhow::Result;

use crate::cli::{AppContext, TreeArgs};
use crate::core::pack::open_session;
use crate::core::structure::render_structure;
use crate::infra::config::load_config;

pub fn run(args: TreeArgs, ctx: &AppContext) -> Result<()> {
    let config = load_config().unwrap_or_default();

    let remote = open_session(
        &args.url,
        args.pat.as_deref(),
        &args.types,
        &args.exclude,
        &config,
        ctx,
    )?;

    let selected = remote.session.collect_selected();
    print!("{}", render_structure(&selected));
    Ok(())
}
