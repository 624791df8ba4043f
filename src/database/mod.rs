pub mod contact_store;
pub mod manager;
pub mod memory;

pub use contact_store::{ContactStore, PgContactStore, StoreError};
pub use manager::{DatabaseError, DbCredentials};
pub use memory::MemoryContactStore;
