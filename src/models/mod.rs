pub mod contact;
pub mod convert;

pub use contact::{Address, Contact, Name, Phone, PhoneType};
