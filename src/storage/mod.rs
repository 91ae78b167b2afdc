pub mod base;
pub mod disk;

pub use base::{StorageError, VacancyStore};
pub use disk::DiskStorage;
