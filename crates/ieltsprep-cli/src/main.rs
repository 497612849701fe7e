//! ieltsprep CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;
mod state;

use commands::dashboard::View;
use commands::login::LoginMethod;
use commands::theme::ThemeChoice;

#[derive(Parser)]
#[command(name = "ieltsprep", version, about = "IELTS preparation: practice, mock exams, AI essay grading")]
struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a starter config file
    Init,

    /// Sign in with Google or Apple, or start a local guest session
    Login {
        /// Sign-in method
        #[arg(long, value_enum, default_value = "google")]
        method: LoginMethod,

        /// OAuth id token issued by the sign-in provider
        #[arg(long)]
        id_token: Option<String>,

        /// Display name for guest sessions
        #[arg(long)]
        name: Option<String>,
    },

    /// Sign out and forget the local session
    Logout,

    /// Answer the onboarding questionnaire
    Onboard,

    /// Show progress and profile
    Dashboard {
        /// Nested view to show
        #[arg(long, value_enum, default_value = "home")]
        view: View,
    },

    /// Show or change profile settings
    Settings {
        /// New display name
        #[arg(long)]
        name: Option<String>,
    },

    /// Switch between light and dark theme
    Theme {
        #[arg(value_enum, default_value = "toggle")]
        choice: ThemeChoice,
    },

    /// Work through a short reading lesson
    Practice,

    /// Take a timed mock exam
    Exam,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(
                "ieltsprep=info"
                    .parse()
                    .unwrap_or_else(|_| tracing::Level::INFO.into()),
            ),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.config;

    let result = match cli.command {
        Commands::Init => commands::init::execute(),
        Commands::Login {
            method,
            id_token,
            name,
        } => commands::login::execute(config, method, id_token, name).await,
        Commands::Logout => commands::login::logout(),
        Commands::Onboard => commands::onboard::execute(config).await,
        Commands::Dashboard { view } => commands::dashboard::execute(config, view).await,
        Commands::Settings { name } => commands::settings::execute(config, name).await,
        Commands::Theme { choice } => commands::theme::execute(choice),
        Commands::Practice => commands::practice::execute().await,
        Commands::Exam => commands::exam::execute(config).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
