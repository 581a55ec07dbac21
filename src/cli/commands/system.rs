use crate::cli::context::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::utils::build_info;

pub(crate) fn definitions() -> Vec<super::CommandDefinition> {
    use super::CommandDefinition;
    vec![
        CommandDefinition::new(
            "help",
            "Show available commands",
            "help [command]",
            cmd_help,
        ),
        CommandDefinition::new(
            "load",
            "Reload expenses and guests from the backend",
            "load",
            cmd_load,
        ),
        CommandDefinition::new("version", "Show build metadata", "version", cmd_version),
        CommandDefinition::new("exit", "Exit the shell", "exit", cmd_exit),
    ]
}

fn cmd_help(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if let Some(name) = args.first().map(|name| name.to_lowercase()) {
        match context.command(&name) {
            Some(command) => {
                output::section(format!("Help: {}", command.name));
                output::info(format!("  Description: {}", command.description));
                output::info(format!("  Usage: {}", command.usage));
            }
            None => context.suggest_command(args[0]),
        }
        return Ok(());
    }

    output::section("Available commands");
    for command in context.registry.iter() {
        output::info(format!("  {:<10} {}", command.name, command.description));
    }
    output::info("Use `help <command>` for details.");
    Ok(())
}

fn cmd_load(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    context.reload();
    output::success(format!(
        "Loaded {} expenses and {} guests.",
        context.expenses.records().len(),
        context.guests.guests().len()
    ));
    Ok(())
}

fn cmd_version(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let meta = build_info::current();
    output::section(format!("Couple Budget {}", meta.version));
    output::info(format!("  Build hash   : {}", meta.git_hash));
    output::info(format!("  Built at     : {}", meta.timestamp));
    output::info(format!("  Target       : {}", meta.target));
    output::info(format!("  Profile      : {}", meta.profile));
    output::info(format!("  Backend      : {:?}", context.config.backend));
    Ok(())
}

fn cmd_exit(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    Err(CommandError::ExitRequested)
}
