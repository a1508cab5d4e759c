//! Document conversion through pandoc

use crate::adapters::ConvertArgs;
use crate::stdio::metadata::routing::ToolCategory;
use crate::stdio::metadata::types::{build_schema, ToolMetadata};

pub const CONVERT_DOCUMENT: &str = "convert_document";

pub fn convert_tools() -> Vec<ToolMetadata> {
    vec![ToolMetadata {
        name: CONVERT_DOCUMENT,
        category: ToolCategory::Convert,
        description: "Convert a local document with pandoc. Takes input_path (existing source file) and output_path (destination); the output format is inferred from the output_path extension, e.g. report.md -> report.pdf, notes.docx -> notes.html. Common outputs: docx, pdf, html, epub, odt, rst, latex, gfm, plain, pptx.",
        schema: build_schema::<ConvertArgs>(),
    }]
}
