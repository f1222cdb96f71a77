//! # Nudge
//!
//! Tracks discrete and recurring tasks with expected-vs-actual
//! performance, computing a success percentage per completed task.
//!
//! The core is [`scoring::success_percentage`], a pure function mapping a
//! task snapshot to an optional bounded percentage under three policies:
//!
//! * **Unit-based** — delivered quantity over target, capped at 100%.
//! * **Time-based** — expected over actual duration, capped at 150%
//!   (finishing early is rewarded).
//! * **Commute-flavored** — on-time or early is exactly 100%; lateness is
//!   penalized proportionally.
//!
//! Everything around it is glue: [`config`] turns environment variables
//! into an explicit configuration value, [`storage`] is the persistence
//! collaborator (embedded SQLite, schema migration, CRUD with a
//! recurring-definition delete cascade), and [`seed`] inserts development
//! sample data. Writes go through an explicit normalize-validate-assign-id
//! pipeline; validation failures are field-level and never silently
//! corrected.
//!
//! Recurring definitions are configuration only: the data model reserves
//! the recurrence rules, but no engine materializes task instances from
//! them yet.

pub mod commands;
pub mod config;
pub mod error;
pub mod models;
pub mod scoring;
pub mod seed;
pub mod storage;
