pub mod staged_document;

pub use staged_document::StagedDocument;
