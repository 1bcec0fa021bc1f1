pub mod health;
pub mod notes;
pub mod uploads;
pub mod users;
