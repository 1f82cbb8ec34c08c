//! down command - stop and remove the stack's containers

use anyhow::Result;

use crate::backend::DockerBackend;
use crate::cli::Context;
use crate::config::Settings;
use crate::stack::{self, Profile};
use crate::ui::output;

/// Tear the stack down without bringing it back up.
pub fn down(ctx: &Context, dev: bool, volumes: bool) -> Result<i32> {
    let project_dir = ctx.project_dir();
    let load = Settings::load(&project_dir, ctx.config.as_deref())?;

    let backend = DockerBackend::new(&project_dir);
    match stack::tear_down(
        &backend,
        &load.settings,
        Profile::from_dev_flag(dev),
        volumes,
        ctx.verbosity,
    ) {
        Ok(()) => {
            output::print("stack is down", ctx.verbosity);
            Ok(0)
        }
        Err(err) => {
            output::error(&err);
            Ok(err.exit_code())
        }
    }
}
