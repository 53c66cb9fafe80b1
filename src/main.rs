use std::{io, process::ExitCode, sync::Arc};

use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use ytauth::{
    Authenticator,
    authenticator::SystemBrowser,
    cli,
    config::{self, Config},
    error,
    management::KeyringStore,
    youtube::{GoogleClient, YoutubeApi},
};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  author=env!("CARGO_PKG_AUTHORS"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Authorize with Google in the browser
    Login(LoginOptions),

    /// Forget the current session and its stored refresh token
    Logout,

    /// Show the logged in user
    Whoami(WhoamiOptions),

    /// Print the current access token
    Token,

    /// Keep the session refreshed until interrupted
    Session,

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct LoginOptions {
    /// Scopes to request; short names get the Google scope prefix
    scopes: Vec<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct WhoamiOptions {
    /// Confirm the identity with a data API call
    #[clap(long)]
    verify: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

fn init_tracing() {
    // RUST_LOG controls the level; log lines go to stderr so `token` stays pipeable
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Command::Completions(opt) = &cli.command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(opt.shell, &mut cmd, name, &mut io::stdout());
        return ExitCode::SUCCESS;
    }

    init_tracing();

    if let Err(e) = config::load_env() {
        error!("Cannot load environment. Err: {}", e);
    }
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => error!("Invalid configuration in {}. Err: {}", config::env_path().display(), e),
    };

    let google = match GoogleClient::new(config.clone()) {
        Ok(google) => google,
        Err(e) => error!("Cannot create HTTP client. Err: {}", e),
    };
    let store = Arc::new(KeyringStore::new(config.service_name.clone()));
    let auth = match Authenticator::start(
        config,
        store,
        Arc::new(google.clone()),
        Arc::new(SystemBrowser),
    )
    .await
    {
        Ok(auth) => auth,
        Err(e) => error!("Cannot start login listener. Err: {}", e),
    };

    let result = match cli.command {
        Command::Login(opt) => cli::login(&auth, &opt.scopes).await,
        Command::Logout => cli::logout(&auth).await,
        Command::Whoami(opt) => {
            let api = YoutubeApi::new(google, Arc::clone(auth.session()));
            cli::whoami(&auth, &api, opt.verify).await
        }
        Command::Token => cli::token(&auth).await,
        Command::Session => cli::session(&auth).await,
        Command::Completions(_) => Ok(()),
    };

    // Runs on failed commands too, so the listener and refresh task are released
    auth.shutdown().await;
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    }
}
