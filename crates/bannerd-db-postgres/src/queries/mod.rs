//! SQL for the banner catalog and the user table.

pub mod banner;
pub mod catalog;
pub mod user;
