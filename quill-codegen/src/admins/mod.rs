//! Built-in administrators.

mod inventory;

pub use inventory::InventoryAdministrator;
