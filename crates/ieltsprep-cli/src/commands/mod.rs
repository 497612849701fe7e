pub mod dashboard;
pub mod exam;
pub mod init;
pub mod login;
pub mod onboard;
pub mod practice;
pub mod settings;
pub mod theme;

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use ieltsprep_core::gateway::{DataGateway, ProfileHandle};
use ieltsprep_providers::config::{load_config_from, state_dir};
use ieltsprep_providers::{create_store, IeltsprepConfig};

use crate::state::{LocalState, Session};

/// Configuration, local state, and where the state lives.
pub struct Context {
    pub config: IeltsprepConfig,
    pub state_dir: PathBuf,
    pub state: LocalState,
}

impl Context {
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let config = load_config_from(config_path)?;
        let state_dir = state_dir();
        let state = LocalState::load(&state_dir)?;
        Ok(Self {
            config,
            state_dir,
            state,
        })
    }

    /// Local state with default configuration, for commands that never
    /// talk to a service.
    pub fn load_state_only() -> Result<Self> {
        let state_dir = state_dir();
        let state = LocalState::load(&state_dir)?;
        Ok(Self {
            config: IeltsprepConfig::default(),
            state_dir,
            state,
        })
    }

    pub fn save_state(&self) -> Result<()> {
        self.state.save(&self.state_dir)
    }

    pub fn session(&self) -> Result<&Session> {
        self.state
            .session
            .as_ref()
            .context("not signed in. Run `ieltsprep login` first")
    }

    /// Gateway over the configured store, authorized as the current session.
    pub fn gateway(&self) -> Result<DataGateway> {
        let token = self.state.session.as_ref().and_then(|s| s.token());
        Ok(DataGateway::new(create_store(&self.config.store, token)?))
    }

    /// The signed-in user's profile, seeding it if it does not exist yet.
    pub async fn profile(&self) -> Result<(DataGateway, ProfileHandle)> {
        let session = self.session()?;
        let gateway = self.gateway()?;
        let profile = gateway
            .load_or_seed_profile(&session.user())
            .await
            .context("failed to load profile")?;
        Ok((gateway, ProfileHandle::new(&session.uid, profile)))
    }
}

/// Line-oriented reader over stdin.
pub struct Input {
    lines: Lines<BufReader<Stdin>>,
}

impl Input {
    pub fn stdin() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    /// Next line with surrounding whitespace removed; `None` at end of input.
    pub async fn line(&mut self) -> Result<Option<String>> {
        let line = self
            .lines
            .next_line()
            .await
            .context("failed to read input")?;
        Ok(line.map(|l| l.trim().to_string()))
    }

    /// Print `prompt` and read the answer.
    pub async fn ask(&mut self, prompt: &str) -> Result<Option<String>> {
        print!("{prompt}");
        std::io::stdout().flush()?;
        self.line().await
    }
}

/// Parse a 1-based menu choice.
pub fn parse_choice(input: &str, len: usize) -> Option<usize> {
    input
        .parse::<usize>()
        .ok()
        .filter(|n| (1..=len).contains(n))
        .map(|n| n - 1)
}

/// Print a numbered option list.
pub fn print_options<'a>(options: impl IntoIterator<Item = &'a str>, selected: Option<usize>) {
    for (i, option) in options.into_iter().enumerate() {
        let marker = if selected == Some(i) { "*" } else { " " };
        println!("  {marker}{}. {option}", i + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn menu_choices_are_one_based() {
        assert_eq!(parse_choice("1", 4), Some(0));
        assert_eq!(parse_choice("4", 4), Some(3));
        assert_eq!(parse_choice("0", 4), None);
        assert_eq!(parse_choice("5", 4), None);
        assert_eq!(parse_choice("two", 4), None);
    }
}
