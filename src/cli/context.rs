//! Shell state, dispatch and error reporting.

use std::io;

use dialoguer::{theme::ColorfulTheme, Confirm};
use strsim::levenshtein;

use crate::{
    config::{Config, ConfigManager},
    core::{services::ServiceError, ExpenseBook, GuestBook},
    domain::{ExpenseRecord, GuestRecord, RecordId},
    errors::{BudgetError, Diagnosis},
    storage::open_stores,
};

use super::commands::{all_definitions, CommandDefinition, CommandRegistry};
use super::format::NumberStyle;
use super::output;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Core(#[from] BudgetError),
    #[error(transparent)]
    Readline(#[from] rustyline::error::ReadlineError),
    #[error(transparent)]
    Dialoguer(#[from] dialoguer::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error(transparent)]
    Core(#[from] BudgetError),
    #[error(transparent)]
    Dialoguer(#[from] dialoguer::Error),
    #[error("exit requested")]
    ExitRequested,
}

impl From<ServiceError> for CommandError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Budget(err) => CommandError::Core(err),
            ServiceError::Invalid(message) => CommandError::InvalidArguments(message),
        }
    }
}

impl From<crate::errors::ValidationError> for CommandError {
    fn from(err: crate::errors::ValidationError) -> Self {
        CommandError::Core(err.into())
    }
}

pub type CommandResult = Result<(), CommandError>;

pub struct ShellContext {
    pub mode: CliMode,
    pub registry: CommandRegistry,
    pub theme: ColorfulTheme,
    pub config: Config,
    pub expenses: ExpenseBook,
    pub guests: GuestBook,
    pub running: bool,
}

impl ShellContext {
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        let config_manager = ConfigManager::new()?;
        let config = config_manager.load()?;
        let data_dir = config_manager.data_dir(&config);
        let stores = open_stores(&config, &data_dir)?;

        let mut context = Self {
            mode,
            registry: CommandRegistry::new(all_definitions()),
            theme: ColorfulTheme::default(),
            config,
            expenses: ExpenseBook::new(stores.expenses, stores.attachments),
            guests: GuestBook::new(stores.guests),
            running: true,
        };
        context.reload();
        Ok(context)
    }

    /// Refreshes both caches; failures leave them empty and are reported.
    pub(crate) fn reload(&mut self) {
        if let Err(err) = self.expenses.load() {
            output::warning(format!("Could not load expenses: {err}"));
        }
        if let Err(err) = self.guests.load() {
            output::warning(format!("Could not load guests: {err}"));
        }
    }

    pub(crate) fn prompt(&self) -> String {
        "couple-budget> ".to_string()
    }

    pub(crate) fn numbers(&self) -> NumberStyle {
        NumberStyle::from_locale(&self.config.currency_locale)
    }

    pub(crate) fn command(&self, name: &str) -> Option<&CommandDefinition> {
        self.registry.get(name)
    }

    pub(crate) fn command_names(&self) -> Vec<&'static str> {
        self.registry.names().collect()
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        if let Some(definition) = self.registry.get(command) {
            let handler = definition.handler;
            match handler(self, args) {
                Ok(()) => Ok(LoopControl::Continue),
                Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
                Err(err) => Err(err),
            }
        } else {
            self.suggest_command(raw);
            Ok(LoopControl::Continue)
        }
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        output::warning(format!(
            "Unknown command `{}`. Type `help` to see available commands.",
            input
        ));

        let needle = input.to_lowercase();
        let best = self
            .registry
            .names()
            .map(|name| (levenshtein(name, &needle), name))
            .min_by_key(|(distance, _)| *distance);

        if let Some((distance, name)) = best {
            if distance <= 3 {
                output::info(format!("Suggestion: `{}`?", name));
            }
        }
    }

    pub(crate) fn confirm(&self, prompt: &str) -> Result<bool, CommandError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        Ok(Confirm::with_theme(&self.theme)
            .with_prompt(prompt)
            .default(false)
            .interact()?)
    }

    pub(crate) fn confirm_exit(&self) -> Result<bool, CliError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        Ok(Confirm::with_theme(&self.theme)
            .with_prompt("Exit shell?")
            .default(true)
            .interact()?)
    }

    pub(crate) fn report_error(&self, err: CommandError) {
        match err {
            CommandError::ExitRequested => {}
            CommandError::InvalidArguments(message) => {
                output::error(message);
                output::hint("Use `help <command>` for usage details.");
            }
            CommandError::Core(err) => {
                output::error(&err);
                let diagnosis = err.diagnosis();
                if diagnosis != Diagnosis::Generic {
                    output::hint(diagnosis.message());
                }
            }
            other => output::error(other),
        }
    }

    /// Resolves a full id or a unique id prefix against the expense cache.
    pub(crate) fn expense_id(&self, input: &str) -> Result<RecordId, CommandError> {
        let matches: Vec<&ExpenseRecord> = self
            .expenses
            .records()
            .iter()
            .filter(|record| record.id.as_str().starts_with(input))
            .collect();
        unique_id(input, matches.iter().map(|record| &record.id))
    }

    pub(crate) fn guest_id(&self, input: &str) -> Result<RecordId, CommandError> {
        let matches: Vec<&GuestRecord> = self
            .guests
            .guests()
            .iter()
            .filter(|guest| guest.id.as_str().starts_with(input))
            .collect();
        unique_id(input, matches.iter().map(|guest| &guest.id))
    }
}

fn unique_id<'a>(
    input: &str,
    candidates: impl ExactSizeIterator<Item = &'a RecordId>,
) -> Result<RecordId, CommandError> {
    if input.is_empty() {
        return Err(CommandError::InvalidArguments("an id is required".into()));
    }
    let count = candidates.len();
    let mut candidates = candidates;
    match (count, candidates.next()) {
        (1, Some(id)) => Ok(id.clone()),
        (0, _) => Err(BudgetError::NotFound(input.to_string()).into()),
        _ => Err(CommandError::InvalidArguments(format!(
            "id prefix `{input}` matches {count} records; type more characters"
        ))),
    }
}
