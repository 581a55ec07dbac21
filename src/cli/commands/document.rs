use std::path::Path;

use crate::cli::context::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::core::search::search_expenses;
use crate::core::services::DocumentService;
use crate::domain::ExpenseCategory;
use crate::storage::Attachment;

use super::{expense::print_records, CommandDefinition};

const DOC_USAGE: &str = "doc <title> <file> [<title> <file> ...] | doc list [text]";

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![CommandDefinition::new(
        "doc",
        "Upload documents or list them",
        DOC_USAGE,
        cmd_doc,
    )]
}

fn cmd_doc(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.first().is_some_and(|first| first.eq_ignore_ascii_case("list")) {
        let query = args[1..].join(" ");
        let documents = search_expenses(
            context.expenses.by_category(ExpenseCategory::Document),
            &query,
        );
        print_records(&documents, context.numbers());
        return Ok(());
    }
    if args.is_empty() || args.len() % 2 != 0 {
        return Err(CommandError::InvalidArguments(format!("usage: {DOC_USAGE}")));
    }

    let mut items = Vec::with_capacity(args.len() / 2);
    for pair in args.chunks(2) {
        let attachment = Attachment::from_path(Path::new(pair[1]))?;
        items.push((pair[0].to_string(), attachment));
    }

    let report = DocumentService::add_many(&mut context.expenses, items);
    for record in &report.created {
        output::success(format!("Document `{}` stored.", record.description));
    }
    if let Some((title, err)) = report.failed {
        output::error(format!("Document `{title}` failed: {err}"));
        let diagnosis = err.diagnosis();
        if diagnosis != crate::errors::Diagnosis::Generic {
            output::hint(diagnosis.message());
        }
        if report.skipped > 0 {
            output::warning(format!("{} remaining document(s) were not sent.", report.skipped));
        }
    }
    Ok(())
}
