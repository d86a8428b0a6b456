//! Result export to a paginated PDF document.
//!
//! The view is laid out at a fixed width in the light theme, rasterised with
//! resvg/tiny-skia, then sliced into page-height bands. Each band becomes
//! one portrait page, so tall results span several pages with no gaps or
//! overlaps between them.

use chem_core::Theme;

use crate::error::{RenderError, RenderResult};
use crate::view::{ResultView, ViewRenderer};

/// Configuration for document export.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Fixed layout width in CSS pixels (A4 at 96 dpi by default).
    pub layout_width: u32,
    /// Page width in millimetres.
    pub page_width_mm: f32,
    /// Page height in millimetres.
    pub page_height_mm: f32,
    /// Scale factor (e.g. 2.0 for crisper text).
    pub scale: f32,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            layout_width: 794,
            page_width_mm: 210.0,
            page_height_mm: 297.0,
            scale: 1.0,
        }
    }
}

/// A vertical slice of the rendered image, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageBand {
    /// Offset from the top of the image.
    pub offset: u32,
    /// Band height.
    pub height: u32,
}

/// A finished document ready to be saved.
#[derive(Debug, Clone)]
pub struct ExportedDocument {
    /// PDF bytes.
    pub bytes: Vec<u8>,
    /// Number of pages.
    pub page_count: usize,
    /// Suggested file name.
    pub filename: String,
}

/// Split `total_height` into consecutive bands of at most `band_height`.
///
/// The bands cover `0..total_height` exactly, in order.
#[must_use]
pub fn page_bands(total_height: u32, band_height: u32) -> Vec<PageBand> {
    if total_height == 0 {
        return Vec::new();
    }
    let band_height = if band_height == 0 {
        total_height
    } else {
        band_height
    };

    let mut bands = Vec::new();
    let mut offset = 0;
    while offset < total_height {
        let height = band_height.min(total_height - offset);
        bands.push(PageBand { offset, height });
        offset += height;
    }
    bands
}

/// File name for an exported result: whitespace runs become underscores.
#[must_use]
pub fn document_filename(display_name: &str) -> String {
    let stem: String = display_name
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | ':') { '_' } else { c })
        .collect();
    if stem.is_empty() {
        "compound.pdf".to_string()
    } else {
        format!("{stem}.pdf")
    }
}

/// Exports result views to PDF.
pub struct DocumentExporter {
    config: ExportConfig,
}

impl DocumentExporter {
    /// Create a new exporter with the given configuration.
    #[must_use]
    pub fn new(config: ExportConfig) -> Self {
        Self { config }
    }

    /// Create an exporter with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(ExportConfig::default())
    }

    /// The renderer used for export: light theme and fixed width, whatever
    /// the active on-screen theme is.
    #[must_use]
    pub fn renderer(&self) -> ViewRenderer {
        ViewRenderer {
            width: self.config.layout_width,
            theme: Theme::Light,
            scale: self.config.scale,
        }
    }

    /// Band height in pixels for a raster of the given width.
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn band_height(&self, raster_width: u32) -> u32 {
        let ratio = self.config.page_height_mm / self.config.page_width_mm;
        ((raster_width as f32 * ratio).round() as u32).max(1)
    }

    /// Render, paginate and encode a view as PDF.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Export`] if any step fails; no partial
    /// document is returned.
    #[allow(clippy::cast_precision_loss)]
    pub fn export(&self, view: &ResultView) -> RenderResult<ExportedDocument> {
        let svg = self.renderer().render_svg(view);
        let pixmap = rasterize_svg(&svg)?;
        let (px_w, px_h) = (pixmap.width(), pixmap.height());

        let bands = page_bands(px_h, self.band_height(px_w));
        let page_w = self.config.page_width_mm;
        let page_h = self.config.page_height_mm;
        // Map the raster width onto the page width.
        let dpi = px_w as f32 / (page_w / 25.4);

        let (doc, first_page, first_layer) = printpdf::PdfDocument::new(
            view.title.as_str(),
            printpdf::Mm(page_w),
            printpdf::Mm(page_h),
            "Layer 1",
        );

        for (idx, band) in bands.iter().enumerate() {
            let (page, layer) = if idx == 0 {
                (first_page, first_layer)
            } else {
                doc.add_page(printpdf::Mm(page_w), printpdf::Mm(page_h), "Layer 1")
            };
            let current_layer = doc.get_page(page).get_layer(layer);

            let rect = tiny_skia::IntRect::from_xywh(0, band_top(band)?, px_w, band.height)
                .ok_or_else(|| RenderError::Export(format!("invalid page band {band:?}")))?;
            let slice = pixmap
                .clone_rect(rect)
                .ok_or_else(|| RenderError::Export(format!("page band {band:?} out of range")))?;
            let png_data = slice
                .encode_png()
                .map_err(|e| RenderError::Export(format!("PNG encoding failed: {e}")))?;

            // Decode PNG using printpdf's bundled image crate for compatibility
            let dynamic_image = printpdf::image_crate::load_from_memory(&png_data)
                .map_err(|e| RenderError::Export(format!("Failed to decode PNG for PDF: {e}")))?;
            let pdf_image = printpdf::Image::from_dynamic_image(&dynamic_image);

            let band_h_mm = band.height as f32 / dpi * 25.4;
            let transform = printpdf::ImageTransform {
                translate_x: Some(printpdf::Mm(0.0)),
                // PDF origin is bottom-left; pin the band to the top edge.
                translate_y: Some(printpdf::Mm(page_h - band_h_mm)),
                dpi: Some(dpi),
                ..Default::default()
            };
            pdf_image.add_to_layer(current_layer, transform);
        }

        let bytes = doc
            .save_to_bytes()
            .map_err(|e| RenderError::Export(format!("PDF save failed: {e}")))?;

        tracing::info!(
            "Exported '{}' as {} page(s), {} bytes",
            view.title,
            bands.len(),
            bytes.len()
        );

        Ok(ExportedDocument {
            bytes,
            page_count: bands.len(),
            filename: document_filename(&view.title),
        })
    }
}

fn band_top(band: &PageBand) -> RenderResult<i32> {
    i32::try_from(band.offset)
        .map_err(|_| RenderError::Export(format!("page offset {} too large", band.offset)))
}

/// Rasterize an SVG string to a tiny-skia Pixmap.
///
/// # Errors
///
/// Returns [`RenderError::Export`] if the SVG cannot be parsed or the
/// pixmap cannot be allocated.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn rasterize_svg(svg_string: &str) -> RenderResult<tiny_skia::Pixmap> {
    let mut opt = usvg::Options::default();
    opt.fontdb_mut().load_system_fonts();

    let tree = usvg::Tree::from_str(svg_string, &opt)
        .map_err(|e| RenderError::Export(format!("SVG parsing failed: {e}")))?;

    let px_w = tree.size().width().ceil() as u32;
    let px_h = tree.size().height().ceil() as u32;

    let mut pixmap = tiny_skia::Pixmap::new(px_w.max(1), px_h.max(1))
        .ok_or_else(|| RenderError::Export("Failed to create pixmap".to_string()))?;

    resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

    Ok(pixmap)
}
