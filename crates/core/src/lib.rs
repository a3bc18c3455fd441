//! Core types shared by every celledit crate.
//!
//! No grid, no transport, no event plumbing. Just the vocabulary:
//! where a cell is, which row it belongs to, and how its column is edited.

pub mod cell;
pub mod field;
pub mod registry;

pub use cell::{CellRef, RowId};
pub use field::{FieldDescriptor, FieldType, SelectOption};
pub use registry::{FieldRegistry, RegistryError};
