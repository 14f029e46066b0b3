use tracing::info;

use crate::cli::core::{Args, CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::registry::{Access, CommandEntry};
use crate::core::Session;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "login",
            "Start a session as a configured user",
            "login <username|display name>",
            Access::Anyone,
            cmd_login,
        ),
        CommandEntry::new("logout", "End the session", "logout", Access::LoggedIn, cmd_logout),
        CommandEntry::new(
            "whoami",
            "Show the current user and role",
            "whoami",
            Access::LoggedIn,
            cmd_whoami,
        ),
    ]
}

fn cmd_login(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = Args::parse(args);
    let name = args.require(0, "login <username|display name>")?;
    let snapshot = context.store.read_all()?;
    let session = Session::login(&snapshot, name)?;
    io::print_success(format!(
        "Logged in as {} ({}).",
        session.display_name, session.role
    ));
    context.session = Some(session);
    Ok(())
}

fn cmd_logout(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let session = context.session.take().ok_or(CommandError::NotLoggedIn)?;
    info!(user = %session.username, session = %session.id, "logged out");
    io::print_info(format!("Goodbye, {}.", session.display_name));
    Ok(())
}

fn cmd_whoami(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let session = context.session.as_ref().ok_or(CommandError::NotLoggedIn)?;
    io::print_info(format!(
        "{} ({}) as {}, session {}",
        session.display_name, session.username, session.role, session.id
    ));
    Ok(())
}
