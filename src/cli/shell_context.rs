use tracing::{info, warn};

use crate::{
    config::{Config, ConfigManager},
    core::{
        services::{OpContext, PricingService},
        Clock, Session, SystemClock,
    },
    errors::OpsError,
    storage::{CsvBackend, LedgerStore, SchemaAction, SheetStore},
};

use super::commands;
use super::core::{CliError, CommandError};
use super::registry::CommandRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

pub struct ShellContext {
    pub mode: CliMode,
    pub registry: CommandRegistry,
    pub config: Config,
    pub store: Box<dyn LedgerStore>,
    pub clock: Box<dyn Clock>,
    pub session: Option<Session>,
    pub last_command: Option<String>,
    pub running: bool,
}

impl ShellContext {
    /// Opens the CSV ledger under the configured data directory.
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        let manager = ConfigManager::new()?;
        let config = manager.load()?;
        let dir = manager.sheets_dir(&config);
        let backend = CsvBackend::open(&dir).map_err(OpsError::from)?;
        let store = SheetStore::new(backend, config.cache_ttl(), config.retry_policy())
            .with_max_rows(config.max_rows);
        let clock = SystemClock::new(config.timezone()?);
        info!(dir = %dir.display(), "ledger opened");
        Self::with_parts(mode, config, Box::new(store), Box::new(clock))
    }

    /// Prepares the sheets and default configuration on `store`.
    pub fn with_parts(
        mode: CliMode,
        config: Config,
        store: Box<dyn LedgerStore>,
        clock: Box<dyn Clock>,
    ) -> Result<Self, CliError> {
        for (sheet, action) in store.ensure_all()? {
            if action == SchemaAction::Repaired {
                warn!(sheet = %sheet, "header row repaired");
            }
        }
        PricingService::seed_defaults(store.as_ref())?;

        let mut registry = CommandRegistry::new();
        commands::register_all(&mut registry);
        Ok(Self {
            mode,
            registry,
            config,
            store,
            clock,
            session: None,
            last_command: None,
            running: true,
        })
    }

    pub fn command_names(&self) -> Vec<&'static str> {
        self.registry.names().collect()
    }

    pub fn prompt(&self) -> String {
        match &self.session {
            Some(session) => format!("agent-ledger({})> ", session.username),
            None => "agent-ledger> ".to_string(),
        }
    }

    /// Operation context for the logged-in session.
    pub fn op(&self) -> Result<OpContext<'_>, CommandError> {
        let session = self.session.as_ref().ok_or(CommandError::NotLoggedIn)?;
        Ok(OpContext::new(self.store.as_ref(), self.clock.as_ref(), session))
    }

    pub fn money(&self, value: f64) -> String {
        super::output::money(&self.config.currency_symbol, value)
    }
}
