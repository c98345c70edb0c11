//! Schema, record encoding, and physical/virtual tables.

mod field;
mod physical;
mod record;
mod relation;
#[allow(clippy::module_inception)]
mod table;
pub(crate) mod validation;
mod virtual_table;

pub use field::Field;
pub use physical::PhysicalTable;
pub use record::Record;
pub use relation::Relation;
pub use table::Table;
pub use virtual_table::VirtualTable;
