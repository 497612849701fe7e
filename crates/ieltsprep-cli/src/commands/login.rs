//! The `ieltsprep login` and `ieltsprep logout` commands.

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::ValueEnum;
use uuid::Uuid;

use ieltsprep_core::traits::{AuthUser, SignInMethod};
use ieltsprep_providers::{create_identity, StoreConfig};

use super::Context;
use crate::state::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LoginMethod {
    Google,
    Apple,
    /// Local profile without an account; needs a file or memory store.
    Guest,
}

pub async fn execute(
    config_path: Option<PathBuf>,
    method: LoginMethod,
    id_token: Option<String>,
    name: Option<String>,
) -> Result<()> {
    let mut ctx = Context::load(config_path.as_deref())?;

    let (user, method_name) = match method {
        LoginMethod::Guest => {
            if matches!(ctx.config.store, StoreConfig::Firestore { .. }) {
                anyhow::bail!("guest sessions need a local store; sign in with --method google or apple");
            }
            let user = AuthUser {
                uid: format!("guest-{}", Uuid::new_v4().simple()),
                display_name: name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
                email: None,
                id_token: String::new(),
            };
            (user, "guest")
        }
        LoginMethod::Google | LoginMethod::Apple => {
            let sign_in = if method == LoginMethod::Google {
                SignInMethod::Google
            } else {
                SignInMethod::Apple
            };
            let token = id_token.context("--id-token is required for google and apple sign-in")?;
            let identity = create_identity(&ctx.config.identity)?;
            let user = identity
                .sign_in(sign_in, &token)
                .await
                .context("sign-in failed")?;
            let method_name = if sign_in == SignInMethod::Google {
                "google"
            } else {
                "apple"
            };
            (user, method_name)
        }
    };

    ctx.state.session = Some(Session::from_user(user, method_name));
    let (_, handle) = ctx.profile().await?;
    ctx.save_state()?;

    let profile = handle.profile();
    if profile.name.is_empty() {
        println!("Signed in ({method_name}).");
    } else {
        println!("Signed in as {} ({method_name}).", profile.name);
    }
    if profile.has_completed_onboarding {
        println!("Run `ieltsprep dashboard` to continue.");
    } else {
        println!("Run `ieltsprep onboard` to set up your study plan.");
    }
    Ok(())
}

pub fn logout() -> Result<()> {
    let mut ctx = Context::load_state_only()?;
    if ctx.state.session.take().is_none() {
        println!("Not signed in.");
        return Ok(());
    }
    ctx.save_state()?;
    println!("Signed out.");
    Ok(())
}
