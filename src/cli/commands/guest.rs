use crate::cli::context::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::core::search::SideFilter;
use crate::domain::{Displayable, GuestSide, NewGuest};

use super::{Args, CommandDefinition};

const ADD_USAGE: &str = "guest-add <name> <bride|groom> [--child]";

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new(
            "guests",
            "List guests with counts",
            "guests [--side all|bride|groom] [name]",
            cmd_guests,
        ),
        CommandDefinition::new("guest-add", "Add a guest", ADD_USAGE, cmd_guest_add),
        CommandDefinition::new("guest-rm", "Remove a guest", "guest-rm <id>", cmd_guest_rm),
    ]
}

fn cmd_guests(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = Args::parse(args, &["side"])?;
    let side = match args.value("side") {
        Some(raw) => raw.parse::<SideFilter>()?,
        None => SideFilter::All,
    };
    let query = args.rest(0);
    let guests = context.guests.filter(&query, side);

    if guests.is_empty() {
        output::info("No guests found.");
    } else {
        let rows: Vec<Vec<String>> = guests
            .iter()
            .map(|guest| {
                vec![
                    guest.id.as_str().chars().take(8).collect(),
                    guest.name.clone(),
                    guest.side.to_string(),
                    if guest.is_child { "yes" } else { "-" }.to_string(),
                ]
            })
            .collect();
        output::table(&["ID", "NAME", "SIDE", "CHILD"], &rows);
    }

    let stats = context.guests.stats();
    output::info(format!(
        "Total: {} (bride {}, groom {}, children {})",
        stats.total, stats.bride, stats.groom, stats.children
    ));
    Ok(())
}

fn cmd_guest_add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = Args::parse(args, &[])?;
    let name = args.required(0, ADD_USAGE)?;
    let side: GuestSide = args.required(1, ADD_USAGE)?.parse()?;
    let guest = NewGuest::new(name, side)?.child(args.flag("child"));
    let stored = context.guests.add(guest)?;
    output::success(format!("Guest `{}` added.", stored.name));
    Ok(())
}

fn cmd_guest_rm(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let raw = args
        .first()
        .ok_or_else(|| CommandError::InvalidArguments("an id is required".into()))?;
    let id = context.guest_id(raw)?;
    let label = context
        .guests
        .guests()
        .iter()
        .find(|guest| guest.id == id)
        .map(|guest| guest.display_label())
        .unwrap_or_default();
    if !context.confirm(&format!("Remove {label}?"))? {
        return Ok(());
    }
    context.guests.delete(&id)?;
    output::success(format!("Guest {label} removed."));
    Ok(())
}
