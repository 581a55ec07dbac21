pub mod category;
pub mod common;
pub mod expense;
pub mod guest;
pub mod period;

pub use category::{CategoryDomain, ExpenseCategory};
pub use common::{Displayable, RecordId};
pub use expense::{ExpenseDraft, ExpenseRecord, PaymentStatus};
pub use guest::{GuestRecord, GuestSide, NewGuest};
pub use period::{DueDate, MonthRef};
