//! PDF access via pdfium: text-layer extraction and page rasterisation.
//!
//! ## Why spawn_blocking?
//!
//! The `pdfium-render` crate wraps the pdfium C++ library, which uses
//! thread-local state internally and is not safe to call from async
//! contexts. `tokio::task::spawn_blocking` moves the work onto a dedicated
//! thread pool thread designed for blocking operations, so the async
//! worker threads never stall on CPU-heavy rendering.
//!
//! Both entry points open the document fresh; a prescription is one or two
//! pages, so re-opening is cheaper than threading a non-`Send` document
//! handle between stages.

use crate::error::RxParseError;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::debug;

/// Read the embedded text layer of every page, joined with newlines.
///
/// Returns whatever the PDF carries, including the empty string for pure
/// image scans; the caller applies the sufficiency threshold.
pub async fn extract_text_layer(pdf_path: &Path) -> Result<String, RxParseError> {
    let path = pdf_path.to_path_buf();
    tokio::task::spawn_blocking(move || extract_text_layer_blocking(&path))
        .await
        .map_err(|e| RxParseError::Internal(format!("text-layer task panicked: {e}")))?
}

fn extract_text_layer_blocking(pdf_path: &Path) -> Result<String, RxParseError> {
    let pdfium = bind_pdfium()?;
    let document = load_document(&pdfium, pdf_path)?;

    let mut text = String::new();
    for page in document.pages().iter() {
        let page_text = page.text().map_err(|e| RxParseError::CorruptPdf {
            path: pdf_path.to_path_buf(),
            detail: format!("{e:?}"),
        })?;
        if !text.is_empty() {
            text.push('\n');
        }
        text.push_str(&page_text.all());
    }

    debug!(
        "Text layer: {} chars across {} pages",
        text.len(),
        document.pages().len()
    );
    Ok(text)
}

/// Rasterise every page of a PDF at the given DPI.
///
/// # Returns
/// A vector of `(page_index_0based, DynamicImage)` tuples in page order.
pub async fn render_pages(
    pdf_path: &Path,
    dpi: u32,
) -> Result<Vec<(usize, DynamicImage)>, RxParseError> {
    let path = pdf_path.to_path_buf();
    tokio::task::spawn_blocking(move || render_pages_blocking(&path, dpi))
        .await
        .map_err(|e| RxParseError::Internal(format!("render task panicked: {e}")))?
}

fn render_pages_blocking(
    pdf_path: &Path,
    dpi: u32,
) -> Result<Vec<(usize, DynamicImage)>, RxParseError> {
    let pdfium = bind_pdfium()?;
    let document = load_document(&pdfium, pdf_path)?;

    let pages = document.pages();
    let mut results = Vec::with_capacity(pages.len() as usize);

    for (idx, page) in pages.iter().enumerate() {
        // PDF points are 1/72 inch; scale the page width to the target DPI.
        let width_px = (page.width().value * dpi as f32 / 72.0).round() as i32;
        let render_config = PdfRenderConfig::new().set_target_width(width_px.max(1));

        let bitmap = page.render_with_config(&render_config).map_err(|e| {
            RxParseError::RasterisationFailed {
                page: idx + 1,
                detail: format!("{e:?}"),
            }
        })?;

        let image = bitmap.as_image();
        debug!(
            "Rendered page {} → {}x{} px @ {} DPI",
            idx + 1,
            image.width(),
            image.height(),
            dpi
        );
        results.push((idx, image));
    }

    Ok(results)
}

// ── pdfium plumbing ──────────────────────────────────────────────────────

fn bind_pdfium() -> Result<Pdfium, RxParseError> {
    // Pdfium::default() panics when no library can be bound; bind explicitly
    // so the failure surfaces as a typed error with a hint instead.
    let bindings = match std::env::var("PDFIUM_LIB_PATH") {
        Ok(path) if !path.is_empty() => Pdfium::bind_to_library(&path),
        _ => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library()),
    }
    .map_err(|e| RxParseError::PdfiumBindingFailed(format!("{e:?}")))?;
    Ok(Pdfium::new(bindings))
}

fn load_document<'a>(
    pdfium: &'a Pdfium,
    pdf_path: &Path,
) -> Result<PdfDocument<'a>, RxParseError> {
    pdfium
        .load_pdf_from_file(pdf_path, None)
        .map_err(|e| RxParseError::CorruptPdf {
            path: pdf_path.to_path_buf(),
            detail: format!("{e:?}"),
        })
}
