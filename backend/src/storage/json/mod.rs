//! JSON file storage for the board document.

pub mod connection;
pub mod document_repository;

#[cfg(test)]
pub mod test_utils;

pub use connection::JsonFileConnection;
pub use document_repository::DocumentRepository;
