use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

use jpeg_to_pdf::JpegToPdf;
use log::{info, warn};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("pdf encode failed: {0}")]
    Encode(String),
}

/// Concatenates ordered page images into one paginated document.
pub trait DocumentAssembler: Send + Sync {
    /// Returns `false` (writing nothing) when the page list is empty.
    fn assemble(&self, pages: &[PathBuf], output: &Path) -> Result<bool, PdfError>;
}

/// Assembles the engine's normalized JPEG pages into a PDF.
#[derive(Debug, Default)]
pub struct JpegPdfAssembler;

impl DocumentAssembler for JpegPdfAssembler {
    fn assemble(&self, pages: &[PathBuf], output: &Path) -> Result<bool, PdfError> {
        assemble_pdf(pages, output)
    }
}

/// One JPEG per PDF page, in the given order.
pub fn assemble_pdf(pages: &[PathBuf], output: &Path) -> Result<bool, PdfError> {
    if pages.is_empty() {
        warn!("no pages to assemble for {}", output.display());
        return Ok(false);
    }

    let mut doc = JpegToPdf::new();
    for page in pages {
        doc = doc.add_image(fs::read(page)?);
    }

    let mut out = BufWriter::new(File::create(output)?);
    doc.create_pdf(&mut out)
        .map_err(|err| PdfError::Encode(err.to_string()))?;

    info!("assembled {} pages into {}", pages.len(), output.display());
    Ok(true)
}
