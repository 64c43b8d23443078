//! Core library for the mailpeek backend.
//!
//! Three concerns live here, each in its own module:
//!
//! - [`accounts`]: the read-only credential table loaded at startup from a
//!   pipe-separated account list
//! - [`normalize`]: canonicalizing a user-supplied email address into the
//!   table's lookup key
//! - [`graph`]: the Microsoft Graph client that turns a stored refresh token
//!   into an access token and lists the most recent messages
//!
//! The HTTP surface that ties these together lives in `mailpeek-server`.

pub mod accounts;
pub mod graph;
pub mod normalize;

pub use accounts::{Account, AccountStore, AccountsError};
pub use graph::{GraphClient, GraphError};
pub use normalize::normalize_email;
