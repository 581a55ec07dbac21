pub mod aggregation;
pub mod expense_book;
pub mod guest_book;
pub mod recurring;
pub mod search;
pub mod services;

pub use expense_book::ExpenseBook;
pub use guest_book::GuestBook;
