//! Dispatch, error reporting and argument parsing shared by the commands.

use std::{collections::HashMap, io};

use chrono::NaiveDate;
use rustyline::error::ReadlineError;
use strsim::levenshtein;

use crate::{domain::PaymentMethod, errors::OpsError};

use super::io as cli_io;
pub use super::shell_context::{CliMode, ShellContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

pub type CommandResult = Result<(), CommandError>;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Ops(#[from] OpsError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Readline(#[from] ReadlineError),
    #[error("{0}")]
    Command(String),
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Not logged in. Use `login <name>` first.")]
    NotLoggedIn,
    #[error("{0}")]
    InvalidArguments(String),
    #[error(transparent)]
    Ops(#[from] OpsError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Dialoguer(#[from] dialoguer::Error),
    #[error("exit requested")]
    ExitRequested,
}

impl From<CommandError> for CliError {
    fn from(err: CommandError) -> Self {
        CliError::Command(err.to_string())
    }
}

impl ShellContext {
    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        let Some(entry) = self.registry.get(command) else {
            self.suggest_command(raw);
            return Ok(LoopControl::Continue);
        };
        if entry.requires_login() && self.session.is_none() {
            return Err(CommandError::NotLoggedIn);
        }
        let handler = entry.handler;
        match handler(self, args) {
            Ok(()) => Ok(LoopControl::Continue),
            Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
            Err(err) => Err(err),
        }
    }

    #[cfg(test)]
    pub(crate) fn process_line(&mut self, line: &str) -> Result<LoopControl, CommandError> {
        let tokens = match crate::cli::shell::parse_command_line(line) {
            Ok(tokens) => tokens,
            Err(err) => {
                self.print_warning(&err.to_string());
                return Ok(LoopControl::Continue);
            }
        };
        if tokens.is_empty() {
            return Ok(LoopControl::Continue);
        }
        let command = tokens[0].to_lowercase();
        let args: Vec<&str> = tokens.iter().skip(1).map(String::as_str).collect();
        self.dispatch(&command, &tokens[0], &args)
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        cli_io::print_warning(format!(
            "Unknown command `{}`. Type `help` to see available commands.",
            input
        ));
        let needle = input.to_lowercase();
        let best = self
            .registry
            .names()
            .map(|key| (levenshtein(key, &needle), key))
            .min_by_key(|(distance, _)| *distance);
        if let Some((distance, name)) = best {
            if distance <= 3 {
                cli_io::print_info(format!("Suggestion: `{}`?", name));
            }
        }
    }

    pub(crate) fn confirm_exit(&self) -> Result<bool, CliError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        Ok(cli_io::confirm_action("Exit shell?", true)?)
    }

    pub(crate) fn report_error(&self, err: CommandError) -> Result<(), CliError> {
        match err {
            CommandError::ExitRequested => Ok(()),
            CommandError::InvalidArguments(message) => {
                cli_io::print_error(&message);
                cli_io::print_hint("Use `help <command>` for usage details.");
                Ok(())
            }
            CommandError::Ops(OpsError::Connectivity(message)) => {
                cli_io::print_error(format!("Ledger store unavailable: {message}"));
                cli_io::print_hint("Nothing was saved. Check the data directory and retry.");
                Ok(())
            }
            other => {
                cli_io::print_error(other.to_string());
                Ok(())
            }
        }
    }

    pub(crate) fn print_warning(&self, message: &str) {
        cli_io::print_warning(message);
    }
}

/// Positional arguments and `--key=value` options of one command line.
pub(crate) struct Args<'a> {
    positional: Vec<&'a str>,
    options: HashMap<&'a str, &'a str>,
}

impl<'a> Args<'a> {
    pub(crate) fn parse(args: &[&'a str]) -> Self {
        let mut positional = Vec::new();
        let mut options = HashMap::new();
        for &arg in args {
            match arg.strip_prefix("--").and_then(|rest| rest.split_once('=')) {
                Some((key, value)) => {
                    options.insert(key, value);
                }
                None => positional.push(arg),
            }
        }
        Self {
            positional,
            options,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.positional.len()
    }

    pub(crate) fn get(&self, index: usize) -> Option<&'a str> {
        self.positional.get(index).copied()
    }

    pub(crate) fn require(&self, index: usize, usage: &str) -> Result<&'a str, CommandError> {
        self.get(index)
            .ok_or_else(|| CommandError::InvalidArguments(format!("usage: {usage}")))
    }

    pub(crate) fn option(&self, key: &str) -> Option<&'a str> {
        self.options.get(key).copied()
    }

    pub(crate) fn date_option(&self, key: &str) -> Result<Option<NaiveDate>, CommandError> {
        self.option(key).map(parse_date).transpose()
    }
}

pub(crate) fn parse_date(input: &str) -> Result<NaiveDate, CommandError> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").map_err(|_| {
        CommandError::InvalidArguments(format!("invalid date `{}` (use YYYY-MM-DD)", input))
    })
}

pub(crate) fn parse_amount(label: &str, input: &str) -> Result<f64, CommandError> {
    input
        .trim()
        .replace(',', "")
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| CommandError::InvalidArguments(format!("{label} must be a number, got `{input}`")))
}

pub(crate) fn parse_method(input: &str) -> Result<PaymentMethod, CommandError> {
    input.parse().map_err(CommandError::InvalidArguments)
}

pub(crate) fn parse_switch(input: &str) -> Result<bool, CommandError> {
    match input.trim().to_ascii_lowercase().as_str() {
        "on" | "1" | "true" | "yes" => Ok(true),
        "off" | "0" | "false" | "no" => Ok(false),
        other => Err(CommandError::InvalidArguments(format!(
            "expected on or off, got `{other}`"
        ))),
    }
}

#[cfg(test)]
pub(crate) fn process_script(app: &mut ShellContext, lines: &[&str]) -> Result<(), CliError> {
    for line in lines {
        match app.process_line(line) {
            Ok(LoopControl::Continue) => {}
            Ok(LoopControl::Exit) => break,
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}
