use std::time::Duration;

use log::{error, info, warn};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::core::console::{Console, ConsoleError, MenuGroup};
use crate::core::errors::{Error, Result, StoreError};
use crate::core::probe::{HealthProbe, ProbeEvent, ProbeResult};
use crate::core::session::SessionManager;
use crate::storage::ProfileForm;

/// The menu entries, in the order they are shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    AddConnection,
    ListConnections,
    ChangeConnection,
    CheckConnection,
    CheckConnectionInterval,
    Exit,
}

impl Action {
    const MENU: [(&'static str, &'static [Action]); 3] = [
        (
            "Connections",
            &[
                Action::AddConnection,
                Action::ListConnections,
                Action::ChangeConnection,
            ],
        ),
        (
            "Operations",
            &[Action::CheckConnection, Action::CheckConnectionInterval],
        ),
        ("Session", &[Action::Exit]),
    ];

    pub fn label(self) -> &'static str {
        match self {
            Action::AddConnection => "Add connection",
            Action::ListConnections => "Show connections",
            Action::ChangeConnection => "Change current connection",
            Action::CheckConnection => "Check connection",
            Action::CheckConnectionInterval => "Check connection on an interval",
            Action::Exit => "Exit",
        }
    }

    /// Maps a flat menu index back to its action.
    pub fn from_index(index: usize) -> Option<Action> {
        Self::MENU
            .iter()
            .flat_map(|(_, actions)| actions.iter().copied())
            .nth(index)
    }

    pub fn menu() -> Vec<MenuGroup> {
        Self::MENU
            .iter()
            .map(|(title, actions)| MenuGroup {
                title: (*title).to_string(),
                items: actions.iter().map(|a| a.label().to_string()).collect(),
            })
            .collect()
    }
}

enum Flow {
    Continue,
    Exit,
}

/// The interactive session: one menu selection at a time, every dispatch
/// error rendered and survived.
pub struct CommandLoop<'a, C: Console> {
    console: C,
    sessions: &'a SessionManager,
    probe: HealthProbe,
    interval_limit: Option<Duration>,
}

impl<'a, C: Console> CommandLoop<'a, C> {
    pub fn new(console: C, sessions: &'a SessionManager, probe: HealthProbe) -> Self {
        Self {
            console,
            sessions,
            probe,
            interval_limit: None,
        }
    }

    /// Stop an interval probe on its own after `limit`, even without a key press.
    pub fn with_interval_limit(mut self, limit: Option<Duration>) -> Self {
        self.interval_limit = limit;
        self
    }

    pub fn console(&self) -> &C {
        &self.console
    }

    pub fn console_mut(&mut self) -> &mut C {
        &mut self.console
    }

    pub fn into_console(self) -> C {
        self.console
    }

    /// Startup: recover from a corrupt store if the operator agrees, then
    /// either create the first connection or pick one of the stored ones.
    pub async fn bootstrap(&mut self) -> Result<()> {
        let store = self.sessions.store();
        let has_any = match store.has_any() {
            Ok(has_any) => has_any,
            Err(e @ StoreError::Parse { .. }) => {
                self.console.error(&e.to_string());
                if !self
                    .console
                    .confirm("Start over with an empty connection list?")
                    .await?
                {
                    return Err(e.into());
                }
                if let Some(moved) = store.quarantine()? {
                    self.console
                        .text(&format!("Old file kept at {}.", moved.display()));
                }
                false
            }
            Err(e) => return Err(e.into()),
        };

        if has_any {
            self.change_connection().await
        } else {
            self.console.text("You have not any connection.");
            self.add_connection().await
        }
    }

    /// Runs until the operator picks Exit or the console closes.
    pub async fn run(&mut self) -> Result<()> {
        loop {
            let title = match self.sessions.current() {
                Some(session) => format!(
                    "Current connection: [{}] {}",
                    session.profile().alias(),
                    session.profile().host()
                ),
                None => "Current connection: none".to_string(),
            };

            let index = match self.console.select(&title, &Action::menu()).await {
                Ok(index) => index,
                Err(ConsoleError::Closed) => {
                    info!("Console closed, leaving");
                    break;
                }
                Err(e) => return Err(e.into()),
            };

            match self.dispatch(Action::from_index(index)).await {
                Ok(Flow::Continue) => {}
                Ok(Flow::Exit) => break,
                Err(Error::Console(ConsoleError::Closed)) => break,
                Err(e) => {
                    error!("Action failed: {}", e);
                    self.console.error(&e.to_string());
                }
            }
        }
        Ok(())
    }

    async fn dispatch(&mut self, action: Option<Action>) -> Result<Flow> {
        match action {
            Some(Action::AddConnection) => self.add_connection().await?,
            Some(Action::ListConnections) => self.list_connections()?,
            Some(Action::ChangeConnection) => self.change_connection().await?,
            Some(Action::CheckConnection) => self.check_connection().await?,
            Some(Action::CheckConnectionInterval) => self.check_connection_interval().await?,
            Some(Action::Exit) => return Ok(Flow::Exit),
            None => self.console.error("Unsupported"),
        }
        Ok(Flow::Continue)
    }

    async fn add_connection(&mut self) -> Result<()> {
        let form = ProfileForm {
            host: self.console.prompt_text("Host:").await?,
            access_key: self.console.prompt_text("Access key:").await?,
            secret_key: self.console.prompt_text("Secret key:").await?,
            secure: self.console.confirm("Secure:").await?,
            alias: self.console.prompt_text("Give a name:").await?,
        };

        self.console.begin_status("Save connection");
        let console = &mut self.console;
        let saved = self
            .sessions
            .add_and_activate(form, |step| console.status(step));
        self.console.end_status();

        let profile = saved?;
        self.console
            .text(&format!("Connection '{}' saved.", profile.alias()));
        Ok(())
    }

    fn list_connections(&mut self) -> Result<()> {
        let rows: Vec<Vec<String>> = self
            .sessions
            .list()?
            .iter()
            .map(|p| {
                vec![
                    p.alias().to_string(),
                    p.host().to_string(),
                    p.access_key().to_string(),
                    p.secret_key().to_string(),
                    p.secure().to_string(),
                ]
            })
            .collect();
        self.console.table(
            "Connections",
            &["Alias", "Host", "Access Key", "Secret Key", "HTTPS"],
            &rows,
        );
        Ok(())
    }

    async fn change_connection(&mut self) -> Result<()> {
        self.sessions.change_current(&mut self.console).await?;
        Ok(())
    }

    async fn check_connection(&mut self) -> Result<()> {
        let session = self.sessions.current().ok_or(Error::NoActiveSession)?;
        let client = session.client();

        self.console.begin_status("Checking connection...");
        let outcome = tokio::select! {
            result = self.probe.check_once(client.as_ref()) => Ok(Some(result)),
            stopped = self.console.wait_for_stop() => stopped.map(|()| None),
        };
        self.console.end_status();

        match outcome? {
            Some(result) if result.success => self.console.text(&success_line(&result)),
            Some(result) => self.console.error(&failure_line(&result)),
            None => {
                info!("One-shot check cancelled by the operator");
                self.console.text("Check cancelled.");
            }
        }
        Ok(())
    }

    async fn check_connection_interval(&mut self) -> Result<()> {
        if self.sessions.current().is_none() {
            return Err(Error::NoActiveSession);
        }
        let interval = self.ask_interval().await?;

        let cancel = CancellationToken::new();
        let (tx, mut rx) = mpsc::channel(16);
        let task = tokio::spawn(self.probe.clone().check_interval(
            self.sessions.subscribe(),
            interval,
            cancel.clone(),
            tx,
        ));

        self.console
            .text("Probing; press Enter (or Ctrl+C) to stop.");
        self.console.begin_status("Checking connection...");

        let limit = self.interval_limit;
        let deadline = async move {
            match limit {
                Some(limit) => tokio::time::sleep(limit).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::pin!(deadline);

        let mut stop_error = None;
        loop {
            tokio::select! {
                event = rx.recv() => match event {
                    Some(event) => self.console.status(&event_line(&event)),
                    None => break,
                },
                stopped = self.console.wait_for_stop() => {
                    if let Err(e) = stopped {
                        stop_error = Some(e);
                    }
                    break;
                }
                _ = &mut deadline => {
                    info!("Interval probe reached its run limit");
                    break;
                }
            }
        }

        cancel.cancel();
        drop(rx);
        let attempts = task.await.map_err(|e| Error::Task(e.to_string()))?;
        self.console.end_status();
        self.console
            .text(&format!("Stopped after {attempts} attempt(s)."));

        match stop_error {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }

    async fn ask_interval(&mut self) -> Result<Duration> {
        loop {
            let answer = self
                .console
                .prompt_text("Check interval (seconds):")
                .await?;
            match answer.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => return Ok(Duration::from_secs(secs)),
                _ => {
                    warn!("Rejected interval {:?}", answer);
                    self.console
                        .error("Please enter a whole number of seconds greater than zero.");
                }
            }
        }
    }
}

fn success_line(result: &ProbeResult) -> String {
    format!(
        "Connection successful. Duration {} ms.",
        result.duration_ms()
    )
}

fn failure_line(result: &ProbeResult) -> String {
    format!(
        "Connection failed. Duration {} ms. Message: '{}'.",
        result.duration_ms(),
        result.message.as_deref().unwrap_or_default()
    )
}

fn event_line(event: &ProbeEvent) -> String {
    match event {
        ProbeEvent::Started { attempt } => format!("#{attempt} Connection starting..."),
        ProbeEvent::Finished { attempt, result } if result.success => {
            format!("#{attempt} {}", success_line(result))
        }
        ProbeEvent::Finished { attempt, result } => {
            format!("#{attempt} {}", failure_line(result))
        }
        ProbeEvent::Idle { next_in } => format!("Next check in {} s.", next_in.as_secs()),
    }
}
