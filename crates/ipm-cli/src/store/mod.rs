//! Local client state.

pub mod db;

pub use db::{DbError, InstalledIp, StateDb};
