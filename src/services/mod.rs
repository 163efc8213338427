pub mod llm_service;
pub mod pdf_extractor;

pub use llm_service::{DocumentComparer, LlmService};
pub use pdf_extractor::{PdfExtractor, TextExtractor};
