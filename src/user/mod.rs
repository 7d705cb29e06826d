pub mod extractor;
pub mod model;
