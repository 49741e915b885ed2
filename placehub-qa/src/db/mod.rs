//! Database access layer for placehub-qa
//!
//! Query functions per table. Schema creation lives in
//! `placehub_common::db`; these modules only read and write rows.

pub mod answers;
pub mod questions;
pub mod sessions;
pub mod stats;
