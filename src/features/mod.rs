pub mod documents;
pub mod files;
