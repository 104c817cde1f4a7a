//! Common types we'll need all over the language which aren't necessarily
//! specific to a single crate.

mod index;

pub use crate::index::{Get, Index};
