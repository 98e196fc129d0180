pub mod cors;
pub mod json_extractor;
