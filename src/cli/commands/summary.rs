use crate::cli::context::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::core::aggregation::FilterWindow;
use crate::core::services::SummaryService;
use crate::domain::{CategoryDomain, ExpenseCategory};

use super::{Args, CommandDefinition};

const SUMMARY_USAGE: &str = "summary [apartment|wedding|CATEGORY] [--year YYYY] [--month MM]";

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new(
            "summary",
            "Dashboard totals for a domain, or figures for one category",
            SUMMARY_USAGE,
            cmd_summary,
        ),
        CommandDefinition::new(
            "years",
            "Years that have expenses",
            "years",
            cmd_years,
        ),
    ]
}

fn parse_window(args: &Args<'_>) -> Result<FilterWindow, CommandError> {
    let year = args
        .value("year")
        .map(|raw| {
            raw.parse::<i32>()
                .map_err(|_| CommandError::InvalidArguments(format!("invalid year `{raw}`")))
        })
        .transpose()?;
    let month = args
        .value("month")
        .map(|raw| match raw.parse::<u32>() {
            Ok(month) if (1..=12).contains(&month) => Ok(month),
            _ => Err(CommandError::InvalidArguments(format!("invalid month `{raw}`"))),
        })
        .transpose()?;
    Ok(FilterWindow { year, month })
}

fn cmd_summary(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = Args::parse(args, &["year", "month"])?;
    let target = args.positional.first().copied().unwrap_or("apartment");
    let numbers = context.numbers();

    if let Ok(domain) = target.parse::<CategoryDomain>() {
        let window = parse_window(&args)?;
        let summary = SummaryService::dashboard(&context.expenses, domain, window);
        output::section(format!("{} - {}", domain.label(), summary.window_label));
        let rows: Vec<Vec<String>> = summary
            .categories
            .iter()
            .map(|total| vec![total.category.label().to_string(), numbers.money(total.amount)])
            .collect();
        if rows.is_empty() {
            output::info("No expenses in this period.");
        } else {
            output::table(&["CATEGORY", "AMOUNT"], &rows);
        }
        output::info(format!("Total   : {}", numbers.money(summary.total())));
        output::info(format!(
            "Paid    : {} ({})",
            numbers.money(summary.paid),
            numbers.percent(summary.paid_percentage())
        ));
        output::info(format!("Pending : {}", numbers.money(summary.pending)));
        return Ok(());
    }

    let category = target.parse::<ExpenseCategory>().map_err(|_| {
        CommandError::InvalidArguments(format!("usage: {SUMMARY_USAGE}"))
    })?;
    let stats = SummaryService::category_stats(&context.expenses, category);
    output::section(category.label());
    output::info(format!("Records : {}", stats.count));
    output::info(format!("Total   : {}", numbers.money(stats.total)));
    output::info(format!("Average : {}", numbers.money(stats.average)));
    Ok(())
}

fn cmd_years(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let years = SummaryService::available_years(&context.expenses);
    if years.is_empty() {
        output::info("No expenses yet.");
        return Ok(());
    }
    let listed: Vec<String> = years.iter().map(i32::to_string).collect();
    output::info(format!("Years: {}", listed.join(", ")));
    Ok(())
}
