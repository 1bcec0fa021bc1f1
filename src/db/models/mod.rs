//! Database operations, one module per table.

mod notes;
mod users;

pub use users::UserUpdate;
