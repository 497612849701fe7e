//! The `ieltsprep settings` command.

use std::path::PathBuf;

use anyhow::{Context as _, Result};

use ieltsprep_core::model::ProfileUpdate;

use super::dashboard::print_settings;
use super::Context;

pub async fn execute(config_path: Option<PathBuf>, name: Option<String>) -> Result<()> {
    let ctx = Context::load(config_path.as_deref())?;
    let (gateway, mut handle) = ctx.profile().await?;

    if let Some(name) = name {
        let name = name.trim();
        anyhow::ensure!(!name.is_empty(), "name must not be empty");
        handle
            .update(&gateway, ProfileUpdate::rename(name))
            .await
            .context("failed to update name; your profile was not changed")?;
        println!("Name updated to {name}.\n");
    }

    print_settings(handle.profile(), ctx.session()?, ctx.state.theme);
    Ok(())
}
