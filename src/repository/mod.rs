pub mod database;
pub mod task;
pub mod user;
