pub mod process;
pub mod summary;
