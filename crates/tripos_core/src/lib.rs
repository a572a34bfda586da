mod block;
pub mod card;
mod config;
mod error;
mod highlights;
pub mod inline;
mod language;
mod parser;
pub mod qr;
pub mod store;
mod summary;
mod typst;

pub use block::{Block, StyledRun};
pub use card::{AspectRatio, CardImage, FontBook, card_filename, export_card, export_share_card};
pub use config::{CardConfig, CardLabels, Config, DocumentConfig, QrConfig, StoreConfig};
pub use error::{Error, Result};
pub use highlights::{MAX_HIGHLIGHTS, extract_highlights};
pub use language::Language;
pub use qr::{QrAsset, QrFetcher};
pub use store::{GeneratedPlan, SharedPlan, SharedPlanStore, Source, share_url};
pub use summary::{Pace, TripForm, TripSummary, TripSummaryBuilder, destination_from_markdown, extract_duration};

use typst_as_lib::TypstEngine;
use typst_as_lib::typst_kit_options::TypstKitFontOptions;
use typst_library::layout::PagedDocument;
use typst_pdf::PdfOptions;

/// Parse markdown text into a vector of blocks.
pub fn parse(markdown: &str) -> Vec<Block> {
    parser::parse(markdown)
}

/// Convert markdown to Typst markup using default config.
pub fn markdown_to_typst(markdown: &str) -> String {
    markdown_to_typst_with_config(markdown, &Config::compiled_default())
}

/// Convert markdown to Typst markup with custom config.
pub fn markdown_to_typst_with_config(markdown: &str, config: &Config) -> String {
    let blocks = parse(markdown);
    typst::blocks_to_typst(&blocks, &config.document)
}

/// Convert markdown to PDF bytes using default config.
pub fn markdown_to_pdf(markdown: &str) -> Result<Vec<u8>> {
    markdown_to_pdf_with_config(markdown, &Config::compiled_default())
}

/// Compile markdown to a Typst document.
fn compile_document(markdown: &str, config: &Config) -> Result<PagedDocument> {
    let typst_content = markdown_to_typst_with_config(markdown, config);

    let font_options = TypstKitFontOptions::new()
        .include_embedded_fonts(true)
        .include_system_fonts(false);

    let engine = TypstEngine::builder()
        .main_file(typst_content)
        .search_fonts_with(font_options)
        .build();

    engine
        .compile()
        .output
        .map_err(|e| Error::Compile(format!("{:?}", e)))
}

/// Convert markdown to PDF bytes with custom config.
pub fn markdown_to_pdf_with_config(markdown: &str, config: &Config) -> Result<Vec<u8>> {
    let doc = compile_document(markdown, config)?;

    typst_pdf::pdf(&doc, &PdfOptions::default()).map_err(|e| Error::Pdf(format!("{:?}", e)))
}
