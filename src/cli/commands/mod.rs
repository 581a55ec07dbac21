use std::collections::HashMap;

pub mod document;
pub mod expense;
pub mod guest;
pub mod summary;
pub mod system;

use crate::cli::context::{CommandError, CommandResult, ShellContext};

pub(crate) fn all_definitions() -> Vec<CommandDefinition> {
    let mut commands = Vec::new();
    commands.extend(system::definitions());
    commands.extend(expense::definitions());
    commands.extend(summary::definitions());
    commands.extend(document::definitions());
    commands.extend(guest::definitions());
    commands
}

pub type CommandHandler = fn(&mut ShellContext, &[&str]) -> CommandResult;

#[derive(Clone)]
pub struct CommandDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub usage: &'static str,
    pub handler: CommandHandler,
}

impl CommandDefinition {
    pub const fn new(
        name: &'static str,
        description: &'static str,
        usage: &'static str,
        handler: CommandHandler,
    ) -> Self {
        Self {
            name,
            description,
            usage,
            handler,
        }
    }
}

pub struct CommandRegistry {
    commands: HashMap<&'static str, CommandDefinition>,
    order: Vec<&'static str>,
}

impl CommandRegistry {
    pub fn new(definitions: Vec<CommandDefinition>) -> Self {
        let mut commands = HashMap::new();
        let mut order = Vec::new();
        for definition in definitions {
            order.push(definition.name);
            commands.insert(definition.name, definition);
        }
        Self { commands, order }
    }

    pub fn get(&self, name: &str) -> Option<&CommandDefinition> {
        self.commands.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CommandDefinition> {
        self.order
            .iter()
            .filter_map(move |name| self.commands.get(name))
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.order.iter().copied()
    }
}

/// Positional arguments plus `--flag` / `--flag value` options.
#[derive(Debug, Default)]
pub(crate) struct Args<'a> {
    pub positional: Vec<&'a str>,
    options: HashMap<&'a str, Option<&'a str>>,
}

impl<'a> Args<'a> {
    /// Flags listed in `valued` consume the following token as their value.
    pub fn parse(raw: &[&'a str], valued: &[&str]) -> Result<Self, CommandError> {
        let mut parsed = Args::default();
        let mut iter = raw.iter().copied();
        while let Some(token) = iter.next() {
            match token.strip_prefix("--") {
                Some(flag) if valued.contains(&flag) => {
                    let value = iter.next().ok_or_else(|| {
                        CommandError::InvalidArguments(format!("--{flag} needs a value"))
                    })?;
                    parsed.options.insert(flag, Some(value));
                }
                Some(flag) => {
                    parsed.options.insert(flag, None);
                }
                None => parsed.positional.push(token),
            }
        }
        Ok(parsed)
    }

    pub fn flag(&self, name: &str) -> bool {
        self.options.contains_key(name)
    }

    pub fn value(&self, name: &str) -> Option<&'a str> {
        self.options.get(name).copied().flatten()
    }

    pub fn required(&self, index: usize, usage: &str) -> Result<&'a str, CommandError> {
        self.positional
            .get(index)
            .copied()
            .ok_or_else(|| CommandError::InvalidArguments(format!("usage: {usage}")))
    }

    /// Remaining positionals from `index` joined with spaces.
    pub fn rest(&self, index: usize) -> String {
        self.positional
            .get(index..)
            .map(|rest| rest.join(" "))
            .unwrap_or_default()
    }
}
