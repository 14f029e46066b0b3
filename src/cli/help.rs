use crate::cli::io;
use crate::cli::output::section as output_section;
use crate::cli::registry::{Access, CommandEntry, CommandRegistry};

fn access_tag(access: Access) -> &'static str {
    match access {
        Access::Admin => " (admin)",
        Access::Anyone | Access::LoggedIn => "",
    }
}

pub fn print_overview(registry: &CommandRegistry) {
    output_section("Available commands");
    for entry in registry.list() {
        io::print_info(format!(
            "  {:<16} {}{}",
            entry.name,
            entry.description,
            access_tag(entry.access)
        ));
    }
    io::print_info("Use `help <command>` for details.");
}

pub fn print_command(entry: &CommandEntry) {
    output_section(format!("Help: {}", entry.name));
    io::print_info(format!("  Description: {}{}", entry.description, access_tag(entry.access)));
    io::print_info(format!("  Usage: {}", entry.usage));
}
