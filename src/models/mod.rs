pub mod permit;

pub use permit::{cell_text, PermitTable, RawPermit};
