//! Filter chain for mdweave.
//!
//! A [`Filter`] is offered every node of the tree and answers with a
//! [`FilterAction`]. A [`FilterChain`] runs filters in registration order,
//! each one over the whole tree before the next starts.
//!
//! The [`presentation`] module holds the paper-target cosmetic filters that
//! run after the core content filters.

mod chain;
mod filter;
pub mod presentation;

pub use chain::{FilterChain, apply_to_sequence};
pub use filter::{Context, Filter, FilterAction, FilterError};
pub use presentation::{HeaderSpacingFilter, ListingFilter, prepare};
