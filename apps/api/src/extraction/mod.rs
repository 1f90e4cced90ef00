pub mod extractor;
pub mod handlers;
pub mod normalize;
pub mod prompts;

pub use extractor::{DocType, FieldExtractor, UploadedDocument, VisionExtractor};
