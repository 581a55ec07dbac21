use std::path::Path;

use crate::cli::context::{CommandError, CommandResult, ShellContext};
use crate::cli::format::{format_date, NumberStyle};
use crate::cli::output;
use crate::core::recurring::BatchRequest;
use crate::core::services::ExpenseService;
use crate::domain::{
    expense::parse_amount, Displayable, DueDate, ExpenseCategory, ExpenseDraft, ExpenseRecord,
    MonthRef, PaymentStatus,
};
use crate::storage::Attachment;

use super::{Args, CommandDefinition};

const ADD_USAGE: &str =
    "add <CATEGORY> <amount> <YYYY-MM-DD> <description> [--month MM/YYYY] [--paid] [--file PATH]";
const BATCH_USAGE: &str = "batch <CATEGORY> <amount> <MM/YYYY> <count> <due_day> <description>";
const EDIT_USAGE: &str = "edit <id> [--description TEXT] [--amount N] [--date YYYY-MM-DD] \
                          [--month MM/YYYY] [--paid|--pending] [--file PATH]";

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new(
            "list",
            "List expenses, optionally by category and description text",
            "list [CATEGORY|all] [text]",
            cmd_list,
        ),
        CommandDefinition::new("add", "Create an expense", ADD_USAGE, cmd_add),
        CommandDefinition::new(
            "batch",
            "Create a run of monthly charges",
            BATCH_USAGE,
            cmd_batch,
        ),
        CommandDefinition::new("edit", "Change an expense", EDIT_USAGE, cmd_edit),
        CommandDefinition::new("pay", "Mark an expense as paid", "pay <id>", cmd_pay),
        CommandDefinition::new(
            "unpay",
            "Mark an expense as pending",
            "unpay <id>",
            cmd_unpay,
        ),
        CommandDefinition::new("delete", "Delete an expense", "delete <id>", cmd_delete),
    ]
}

fn parse_category(raw: &str) -> Result<ExpenseCategory, CommandError> {
    Ok(raw.parse::<ExpenseCategory>()?)
}

fn attachment(path: Option<&str>) -> Result<Option<Attachment>, CommandError> {
    path.map(|path| Attachment::from_path(Path::new(path)))
        .transpose()
        .map_err(CommandError::from)
}

fn short_id(record: &ExpenseRecord) -> String {
    record.id.as_str().chars().take(8).collect()
}

pub(crate) fn print_records(records: &[&ExpenseRecord], numbers: NumberStyle) {
    if records.is_empty() {
        output::info("No expenses found.");
        return;
    }
    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|record| {
            vec![
                short_id(record),
                format_date(&record.date),
                record.category.label().to_string(),
                record.description.clone(),
                numbers.money(record.amount),
                record.status.to_string(),
                if record.receipt_url.is_some() { "yes" } else { "-" }.to_string(),
            ]
        })
        .collect();
    output::table(
        &["ID", "DATE", "CATEGORY", "DESCRIPTION", "AMOUNT", "STATUS", "FILE"],
        &rows,
    );
}

fn cmd_list(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = Args::parse(args, &[])?;
    let (category, query) = match args.positional.first() {
        Some(first) if first.eq_ignore_ascii_case("all") => (None, args.rest(1)),
        Some(first) => match first.parse::<ExpenseCategory>() {
            Ok(category) => (Some(category), args.rest(1)),
            Err(_) => (None, args.rest(0)),
        },
        None => (None, String::new()),
    };
    let records = ExpenseService::list(&context.expenses, category, &query);
    print_records(&records, context.numbers());
    Ok(())
}

fn cmd_add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = Args::parse(args, &["month", "file"])?;
    let category = parse_category(args.required(0, ADD_USAGE)?)?;
    let amount = parse_amount(args.required(1, ADD_USAGE)?)?;
    let date: DueDate = args.required(2, ADD_USAGE)?.parse()?;
    let description = args.rest(3);

    let mut draft = ExpenseDraft::new(category, description, amount, date.clone());
    if category.is_recurring() {
        let month_ref = match args.value("month") {
            Some(raw) => raw.parse::<MonthRef>()?,
            None => MonthRef::new(date.month(), date.year())?,
        };
        draft = draft.month_ref(month_ref);
    }
    if args.flag("paid") {
        draft = draft.status(PaymentStatus::Paid);
    }

    let file = attachment(args.value("file"))?;
    let record = ExpenseService::create(&mut context.expenses, draft, file)?;
    output::success(format!(
        "Expense {} created: {} ({})",
        short_id(&record),
        record.description,
        context.numbers().money(record.amount)
    ));
    Ok(())
}

fn cmd_batch(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = Args::parse(args, &[])?;
    let number = |index: usize, what: &str| -> Result<u32, CommandError> {
        let raw = args.required(index, BATCH_USAGE)?;
        raw.parse::<u32>()
            .map_err(|_| CommandError::InvalidArguments(format!("{what} `{raw}` is not a number")))
    };
    let request = BatchRequest {
        category: parse_category(args.required(0, BATCH_USAGE)?)?,
        amount: parse_amount(args.required(1, BATCH_USAGE)?)?,
        start: args.required(2, BATCH_USAGE)?.to_string(),
        count: number(3, "count")?,
        due_day: number(4, "due day")?,
        description: args.rest(5),
    };

    let records = ExpenseService::generate_batch(&mut context.expenses, &request)?;
    let (first, last) = match (records.first(), records.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Ok(()),
    };
    output::success(format!(
        "{} charges created ({} to {}).",
        records.len(),
        format_date(&first.date),
        format_date(&last.date)
    ));
    Ok(())
}

fn cmd_edit(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = Args::parse(args, &["description", "amount", "date", "month", "file"])?;
    let id = context.expense_id(args.required(0, EDIT_USAGE)?)?;
    let existing = context
        .expenses
        .get(&id)
        .cloned()
        .ok_or_else(|| CommandError::InvalidArguments(format!("no expense {id}")))?;

    let description = args
        .value("description")
        .map(str::to_string)
        .unwrap_or_else(|| existing.description.clone());
    let amount = match args.value("amount") {
        Some(raw) => parse_amount(raw)?,
        None => existing.amount,
    };
    let date = match args.value("date") {
        Some(raw) => raw.parse::<DueDate>()?,
        None => existing.date.clone(),
    };
    let mut draft = ExpenseDraft::new(existing.category, description, amount, date);
    let month_ref = match args.value("month") {
        Some(raw) => Some(raw.parse::<MonthRef>()?),
        None => existing.month_ref,
    };
    if let Some(month_ref) = month_ref {
        draft = draft.month_ref(month_ref);
    }
    let status = if args.flag("paid") {
        PaymentStatus::Paid
    } else if args.flag("pending") {
        PaymentStatus::Pending
    } else {
        existing.status
    };
    draft = draft.status(status);

    let file = attachment(args.value("file"))?;
    let record = ExpenseService::edit(&mut context.expenses, &id, draft, file)?;
    output::success(format!("Expense {} updated.", short_id(&record)));
    Ok(())
}

fn set_status(context: &mut ShellContext, args: &[&str], status: PaymentStatus) -> CommandResult {
    let raw = args
        .first()
        .ok_or_else(|| CommandError::InvalidArguments("an id is required".into()))?;
    let id = context.expense_id(raw)?;
    let record = context.expenses.set_status(&id, status)?;
    output::success(format!(
        "Expense {} is now {}.",
        short_id(&record),
        record.status
    ));
    Ok(())
}

fn cmd_pay(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    set_status(context, args, PaymentStatus::Paid)
}

fn cmd_unpay(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    set_status(context, args, PaymentStatus::Pending)
}

fn cmd_delete(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let raw = args
        .first()
        .ok_or_else(|| CommandError::InvalidArguments("an id is required".into()))?;
    let id = context.expense_id(raw)?;
    let label = context
        .expenses
        .get(&id)
        .map(|record| record.display_label())
        .unwrap_or_default();
    if !context.confirm(&format!("Delete `{label}`?"))? {
        output::info("Nothing deleted.");
        return Ok(());
    }
    context.expenses.delete(&id)?;
    output::success(format!("Expense `{label}` deleted."));
    Ok(())
}
