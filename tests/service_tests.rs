mod common;

use couple_budget::{
    core::{
        aggregation::FilterWindow,
        recurring::BatchRequest,
        services::{DocumentService, ExpenseService, SummaryService},
        ExpenseBook,
    },
    domain::{CategoryDomain, ExpenseCategory, ExpenseDraft, GuestSide, NewGuest},
    storage::{Attachment, ExpenseStore},
};
use rust_decimal::Decimal;

fn monthly_fees(book: &mut ExpenseBook) -> Vec<couple_budget::domain::ExpenseRecord> {
    let request = BatchRequest {
        category: ExpenseCategory::Fee,
        description: "Condominio".into(),
        amount: Decimal::new(500, 0),
        start: "01/2024".into(),
        count: 12,
        due_day: 10,
    };
    ExpenseService::generate_batch(book, &request).expect("batch stored")
}

#[test]
fn twelve_fees_with_five_paid_add_up() {
    let (mut book, _, _) = common::setup_books();
    let records = monthly_fees(&mut book);
    for record in records.iter().take(5) {
        ExpenseService::toggle_status(&mut book, &record.id).expect("toggle");
    }

    let summary =
        SummaryService::dashboard(&book, CategoryDomain::Apartment, FilterWindow::all_time());
    assert_eq!(summary.total(), Decimal::new(6000, 0));
    assert_eq!(summary.paid, Decimal::new(2500, 0));
    assert_eq!(summary.pending, Decimal::new(3500, 0));
    assert_eq!(summary.category_sum(), Decimal::new(6000, 0));
    assert_eq!(summary.paid_percentage(), Decimal::new(4167, 2));

    let march = SummaryService::dashboard(
        &book,
        CategoryDomain::Apartment,
        FilterWindow::month(Some(2024), 3),
    );
    assert_eq!(march.record_count, 1);
    assert_eq!(march.total(), Decimal::new(500, 0));
}

#[test]
fn cache_survives_a_reload_from_disk() {
    let (mut book, _, storage) = common::setup_books();
    monthly_fees(&mut book);

    let mut reopened = ExpenseBook::new(Box::new(storage.clone()), Box::new(storage));
    assert_eq!(reopened.load().expect("load"), 12);
    let months: Vec<String> = reopened
        .records()
        .iter()
        .filter_map(|record| record.month_ref.map(|m| m.to_string()))
        .collect();
    assert_eq!(months.first().map(String::as_str), Some("01/2024"));
    assert_eq!(months.last().map(String::as_str), Some("12/2024"));
}

#[test]
fn delete_by_id_removes_exactly_one_record() {
    let (mut book, _, storage) = common::setup_books();
    let records = monthly_fees(&mut book);
    let target = records[4].id.clone();

    book.delete(&target).expect("delete");

    let remaining = ExpenseStore::fetch_all(&storage).expect("fetch");
    assert_eq!(remaining.len(), 11);
    assert!(remaining.iter().all(|record| record.id != target));
    let summary =
        SummaryService::dashboard(&book, CategoryDomain::Apartment, FilterWindow::all_time());
    assert_eq!(summary.total(), Decimal::new(5500, 0));
}

#[test]
fn years_come_from_every_record() {
    let (mut book, _, _) = common::setup_books();
    for date in ["2023-05-01", "2024-01-15", "2024-07-20"] {
        let draft = ExpenseDraft::new(
            ExpenseCategory::Buffet,
            "Degustacao",
            Decimal::new(100, 0),
            date.parse().unwrap(),
        );
        ExpenseService::create(&mut book, draft, None).expect("create");
    }
    assert_eq!(SummaryService::available_years(&book), vec![2024, 2023]);
}

#[test]
fn documents_and_guests_share_the_store_directory() {
    let (mut book, mut guests, storage) = common::setup_books();
    let record = DocumentService::add(
        &mut book,
        "Contrato do buffet",
        Some(Attachment::new("contrato.pdf", b"%PDF".to_vec())),
    )
    .expect("document stored");
    let url = record.receipt_url.expect("url");
    assert!(url.starts_with("file://"));
    assert!(storage.base_dir().join("attachments").is_dir());

    guests
        .add(NewGuest::new("Ana", GuestSide::Bride).unwrap())
        .expect("guest");
    guests
        .add(NewGuest::new("Caio", GuestSide::Groom).unwrap().child(true))
        .expect("guest");
    let stats = guests.stats();
    assert_eq!((stats.bride, stats.groom, stats.children), (1, 1, 1));
}

#[test]
fn editing_the_month_keeps_a_single_tag() {
    let (mut book, _, storage) = common::setup_books();
    let draft = ExpenseDraft::new(
        ExpenseCategory::Fee,
        "Condo",
        Decimal::new(450, 0),
        "2024-03-10".parse().unwrap(),
    )
    .month_ref("03/2024".parse().unwrap());
    let created = ExpenseService::create(&mut book, draft, None).expect("create");

    let moved = ExpenseDraft::new(
        ExpenseCategory::Fee,
        created.description.clone(),
        created.amount,
        "2024-04-10".parse().unwrap(),
    )
    .month_ref("04/2024".parse().unwrap());
    let edited = ExpenseService::edit(&mut book, &created.id, moved, None).expect("edit");

    assert_eq!(edited.description, "04/2024 - Condo");
    let stored = ExpenseStore::fetch_all(&storage).expect("fetch");
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].description, "04/2024 - Condo");
    assert_eq!(stored[0].month_ref.map(|m| m.to_string()).as_deref(), Some("04/2024"));
}

#[test]
fn amounts_keep_their_cents_through_the_store() {
    let (mut book, _, storage) = common::setup_books();
    let too_fine = ExpenseDraft::new(
        ExpenseCategory::Furniture,
        "Lamp",
        Decimal::new(10005, 3),
        "2024-05-01".parse().unwrap(),
    );
    let err = ExpenseService::create(&mut book, too_fine, None).unwrap_err();
    assert!(err.is_validation(), "{err}");
    assert!(ExpenseStore::fetch_all(&storage).expect("fetch").is_empty());

    let cents = ExpenseDraft::new(
        ExpenseCategory::Furniture,
        "Lamp",
        Decimal::new(1001, 2),
        "2024-05-01".parse().unwrap(),
    );
    let created = ExpenseService::create(&mut book, cents, None).expect("create");
    let stored = ExpenseStore::fetch_all(&storage).expect("fetch");
    assert_eq!(stored[0].amount, created.amount);
    assert_eq!(book.records()[0].amount, Decimal::new(1001, 2));
}
