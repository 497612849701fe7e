//! The `ieltsprep theme` command.

use anyhow::Result;
use clap::ValueEnum;

use ieltsprep_core::model::Theme;

use super::Context;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ThemeChoice {
    Toggle,
    Light,
    Dark,
}

impl ThemeChoice {
    pub fn apply(self, current: Theme) -> Theme {
        match self {
            ThemeChoice::Toggle => current.toggled(),
            ThemeChoice::Light => Theme::Light,
            ThemeChoice::Dark => Theme::Dark,
        }
    }
}

pub fn execute(choice: ThemeChoice) -> Result<()> {
    let mut ctx = Context::load_state_only()?;
    ctx.state.theme = choice.apply(ctx.state.theme);
    ctx.save_state()?;
    println!("Theme: {}", ctx.state.theme);
    Ok(())
}
