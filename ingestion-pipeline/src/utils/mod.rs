pub mod file_text_extraction;
pub mod pdf_ingestion;
