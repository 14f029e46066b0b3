use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::help;
use crate::cli::io;
use crate::cli::registry::{Access, CommandEntry};

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "help",
            "Show available commands",
            "help [command]",
            Access::Anyone,
            cmd_help,
        ),
        CommandEntry::new(
            "refresh",
            "Drop cached sheets and re-read the ledger",
            "refresh",
            Access::Anyone,
            cmd_refresh,
        ),
        CommandEntry::new("exit", "Exit the shell", "exit", Access::Anyone, cmd_exit),
    ]
}

fn cmd_help(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if let Some(name) = args.first().map(|name| name.to_lowercase()) {
        match context.registry.get(&name) {
            Some(entry) => help::print_command(entry),
            None => context.suggest_command(args[0]),
        }
        return Ok(());
    }
    help::print_overview(&context.registry);
    Ok(())
}

fn cmd_refresh(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    context.store.invalidate();
    let snapshot = context.store.read_all()?;
    let rows: usize = crate::storage::Sheet::ALL
        .iter()
        .map(|sheet| snapshot.table(*sheet).len())
        .sum();
    io::print_success(format!("Ledger reloaded ({rows} rows)."));
    Ok(())
}

fn cmd_exit(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    Err(CommandError::ExitRequested)
}
