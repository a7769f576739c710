//! Shared-expense engine.
//!
//! Persists expenses and the participant links between users and expenses,
//! and keeps the participant-set invariants:
//!
//! - an expense always has at least one participant while it exists;
//! - the creator (or the updater, on update) is always a participant;
//! - a participant set never contains the same user twice;
//! - only participants can change an expense.
//!
//! Every operation touching the link set runs in a single database
//! transaction.

pub use error::EngineError;
pub use expenses::{Expense, ExpenseFields};
pub use money::Amount;
pub use ops::{Engine, EngineBuilder, LeaveOutcome};
pub use users::UserProfile;

mod error;
mod expenses;
mod money;
mod ops;
mod participants;
mod users;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
