use crate::bootstrap::storage;
use snapvault_auth::{authenticate, sign_out, IdentityProvider};
use snapvault_config::Config;
use snapvault_events::{AppEvent, EventBus};
use snapvault_filesystem::LocalStore;
use snapvault_session::{ImageSession, SelectOutcome};
use snapvault_tracker::Completion;
use anyhow::Result;
use std::sync::Arc;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "\
Commands:
  login <user> <password> [email]   Sign in (email confirms a first login)
  load <path>                       Show an image from outside the app
  filter                            Apply the red lighten filter
  save                              Save the current image locally
  upload                            Move the current image to the cloud
  select <name>                     Show a stored image
  delete                            Delete the current image everywhere
  list                              List stored images
  logout                            Sign out
  help                              Show this help
  quit                              Exit";

/// One line of user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Login {
        username: String,
        password: String,
        email: String,
    },
    Load(String),
    Filter,
    Save,
    Upload,
    Select(String),
    Delete,
    List,
    Logout,
    Help,
    Quit,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unknown command '{0}', type 'help'")]
    Unknown(String),

    #[error("Usage: {0}")]
    Usage(&'static str),
}

impl Command {
    /// Parses a line; blank lines yield `None`
    pub fn parse(line: &str) -> Result<Option<Self>, ParseError> {
        let mut words = line.split_whitespace();
        let Some(keyword) = words.next() else {
            return Ok(None);
        };
        let args: Vec<&str> = words.collect();

        let command = match (keyword, args.as_slice()) {
            ("login", [username, password]) => Command::Login {
                username: username.to_string(),
                password: password.to_string(),
                email: String::new(),
            },
            ("login", [username, password, email]) => Command::Login {
                username: username.to_string(),
                password: password.to_string(),
                email: email.to_string(),
            },
            ("login", _) => return Err(ParseError::Usage("login <user> <password> [email]")),
            // Paths may contain spaces
            ("load", [_, ..]) => Command::Load(args.join(" ")),
            ("load", []) => return Err(ParseError::Usage("load <path>")),
            ("select", [name]) => Command::Select(name.to_string()),
            ("select", _) => return Err(ParseError::Usage("select <name>")),
            ("filter", []) => Command::Filter,
            ("save", []) => Command::Save,
            ("upload", []) => Command::Upload,
            ("delete", []) => Command::Delete,
            ("list" | "ls", []) => Command::List,
            ("logout", []) => Command::Logout,
            ("help" | "?", []) => Command::Help,
            ("quit" | "exit", []) => Command::Quit,
            (other, _) => return Err(ParseError::Unknown(other.to_string())),
        };

        Ok(Some(command))
    }
}

/// The two screens of the app: login, then the image screen of one user
pub struct Shell {
    config: Config,
    events: Arc<EventBus>,
    provider: Arc<dyn IdentityProvider>,
    session: Option<ImageSession>,
}

impl Shell {
    pub fn new(config: Config, events: Arc<EventBus>, provider: Arc<dyn IdentityProvider>) -> Self {
        Self {
            config,
            events,
            provider,
            session: None,
        }
    }

    pub fn session(&self) -> Option<&ImageSession> {
        self.session.as_ref()
    }

    /// Reads commands from stdin while delivering remote completions as they land
    pub async fn run(&mut self) -> Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        println!("{}", HELP);

        loop {
            let pending = self.session.as_ref().map_or(0, ImageSession::pending);

            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else { break };
                    match Command::parse(&line) {
                        Ok(Some(Command::Quit)) => break,
                        Ok(Some(command)) => self.execute(command).await,
                        Ok(None) => {}
                        Err(e) => println!("{}", e),
                    }
                }
                Some(_) = next_completion(&mut self.session), if pending > 0 => {}
            }
        }

        self.shutdown().await;
        Ok(())
    }

    /// Runs one command; failures are reported as events, never returned
    pub async fn execute(&mut self, command: Command) {
        match command {
            Command::Help => println!("{}", HELP),
            Command::Quit => self.shutdown().await,
            Command::Login {
                username,
                password,
                email,
            } => self.login(&username, &password, &email).await,
            Command::Logout => self.logout().await,
            command => {
                let Some(session) = self.session.as_mut() else {
                    println!("Sign in first");
                    return;
                };
                if let Err(e) = run_on_session(session, command).await {
                    self.events.emit(AppEvent::Error {
                        context: "Image screen".to_string(),
                        error: e.to_string(),
                    });
                }
            }
        }
    }

    async fn login(&mut self, username: &str, password: &str, email: &str) {
        if self.session.is_some() {
            println!("Already signed in, logout first");
            return;
        }

        let Ok(login) = authenticate(self.provider.as_ref(), &self.events, username, password, email).await else {
            return;
        };

        match self.open_session(&login.username, &login.identity_id).await {
            Ok(session) => self.session = Some(session),
            Err(e) => {
                self.events.emit(AppEvent::Error {
                    context: "Opening image screen".to_string(),
                    error: e.to_string(),
                });
                // Don't leave a half-open sign-in behind
                let _ = sign_out(self.provider.as_ref(), &self.events).await;
            }
        }
    }

    async fn open_session(&self, username: &str, identity_id: &str) -> Result<ImageSession> {
        let local = LocalStore::open(&self.config.storage.local_dir).await?;
        let remote = storage::connect(&self.config, identity_id).await?;

        let session = ImageSession::open(
            username,
            local,
            remote,
            Arc::clone(&self.events),
            self.config.tracker.clone(),
        )
        .await?;

        Ok(session)
    }

    async fn logout(&mut self) {
        let Some(session) = self.session.take() else {
            println!("Not signed in");
            return;
        };
        session.close().await;
        let _ = sign_out(self.provider.as_ref(), &self.events).await;
    }

    /// Waits for in-flight remote requests and signs out
    pub async fn shutdown(&mut self) {
        if self.session.is_some() {
            self.logout().await;
        }
    }
}

async fn run_on_session(session: &mut ImageSession, command: Command) -> Result<()> {
    match command {
        Command::Load(path) => {
            session.load(&path).await?;
        }
        Command::Filter => session.apply_filter()?,
        Command::Save => session.save_locally().await?,
        Command::Upload => session.upload().await?,
        Command::Select(name) => {
            if session.select(&name).await? == SelectOutcome::Downloading {
                println!("Downloading {}...", name);
            }
        }
        Command::Delete => {
            session.delete_current().await?;
        }
        Command::List => {
            if session.names().len() == 0 {
                println!("No images stored");
            }
            for name in session.names() {
                let location = session
                    .location(name)
                    .map(|l| l.to_string())
                    .unwrap_or_default();
                println!("  {} [{}]", name, location);
            }
        }
        Command::Login { .. } | Command::Logout | Command::Help | Command::Quit => {}
    }
    Ok(())
}

async fn next_completion(session: &mut Option<ImageSession>) -> Option<Completion> {
    match session {
        Some(session) => session.next_completion().await,
        None => std::future::pending().await,
    }
}
