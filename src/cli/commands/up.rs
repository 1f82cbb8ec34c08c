//! up command - bring the full stack to a running state

use anyhow::Result;

use crate::backend::DockerBackend;
use crate::cli::Context;
use crate::config::Settings;
use crate::stack::{self, Profile, UpOptions};
use crate::ui::output;

/// Bring the stack up: provision, tear down the previous instance, start.
pub fn up(ctx: &Context, dev: bool, reset: bool) -> Result<i32> {
    let project_dir = ctx.project_dir();
    let load = Settings::load(&project_dir, ctx.config.as_deref())?;
    for path in &load.loaded {
        output::debug(format!("loaded config '{}'", path.display()), ctx.verbosity);
    }

    let backend = DockerBackend::new(&project_dir);
    let opts = UpOptions {
        profile: Profile::from_dev_flag(dev),
        reset,
    };

    match stack::bring_up(&backend, &load.settings, &project_dir, &opts, ctx.verbosity) {
        Ok(code) => Ok(code),
        Err(err) => {
            output::error(&err);
            Ok(err.exit_code())
        }
    }
}
