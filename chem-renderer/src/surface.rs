//! Freehand drawing surface.
//!
//! A [`StrokeCanvas`] owns an always-opaque RGBA buffer. The eraser paints
//! the background color over existing ink rather than clearing pixels, so
//! exported stills never contain transparency.

use chem_core::{BoundingRect, InputEvent, Point, PointerPhase, StillImage, TouchPhase};
use image::ImageEncoder;
use tiny_skia::{
    BlendMode, Color, LineCap, LineJoin, Paint, PathBuilder, Pixmap, PixmapPaint, Stroke,
    Transform,
};

use crate::error::{RenderError, RenderResult};

/// Drawing tool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Tool {
    /// Thin stroke in the foreground color.
    #[default]
    Pen,
    /// Thick stroke in the background color.
    Eraser,
}

/// Stroke and encoding settings for a [`StrokeCanvas`].
#[derive(Debug, Clone)]
pub struct SurfaceConfig {
    /// Pen width in pixels.
    pub pen_width: f32,
    /// Eraser width in pixels.
    pub eraser_width: f32,
    /// Ink color as RGBA bytes.
    pub foreground: [u8; 4],
    /// Background color as RGBA bytes. Alpha is forced to 255.
    pub background: [u8; 4],
    /// JPEG quality 1-100 for exported stills.
    pub jpeg_quality: u8,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            pen_width: 3.0,
            eraser_width: 20.0,
            foreground: [0, 0, 0, 255],
            background: [255, 255, 255, 255],
            jpeg_quality: 80,
        }
    }
}

impl SurfaceConfig {
    fn background_color(&self) -> Color {
        let [r, g, b, _] = self.background;
        Color::from_rgba8(r, g, b, 255)
    }
}

/// Raster drawing surface with pen and eraser strokes.
pub struct StrokeCanvas {
    pixmap: Pixmap,
    config: SurfaceConfig,
    tool: Tool,
    last_point: Option<Point>,
    has_ink: bool,
    enabled: bool,
}

impl StrokeCanvas {
    /// Create a surface filled with the background color.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Surface`] if either dimension is zero.
    pub fn new(width: u32, height: u32, config: SurfaceConfig) -> RenderResult<Self> {
        let pixmap = blank_pixmap(width, height, &config)?;
        Ok(Self {
            pixmap,
            config,
            tool: Tool::Pen,
            last_point: None,
            has_ink: false,
            enabled: true,
        })
    }

    /// Surface width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    /// Surface height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Whether anything has been drawn since creation or the last clear.
    #[must_use]
    pub fn has_ink(&self) -> bool {
        self.has_ink
    }

    /// Whether a stroke is in progress.
    #[must_use]
    pub fn is_drawing(&self) -> bool {
        self.last_point.is_some()
    }

    /// Active tool.
    #[must_use]
    pub fn tool(&self) -> Tool {
        self.tool
    }

    /// Switch tool. Takes effect from the next segment.
    pub fn set_tool(&mut self, tool: Tool) {
        self.tool = tool;
    }

    /// Whether input is accepted.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enable or disable input. Disabling ends any stroke in progress.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.end_stroke();
        }
    }

    /// Begin a stroke at `point`. No-op while input is disabled.
    pub fn start_stroke(&mut self, point: Point) {
        if !self.enabled {
            tracing::debug!("Ignoring stroke start while input is disabled");
            return;
        }
        self.last_point = Some(point);
        self.has_ink = true;
    }

    /// Draw a segment from the last point to `point` if a stroke is active.
    pub fn extend_stroke(&mut self, point: Point) {
        let Some(from) = self.last_point else {
            return;
        };
        self.draw_segment(from, point);
        self.last_point = Some(point);
    }

    /// Finish the current stroke. Idempotent.
    pub fn end_stroke(&mut self) {
        self.last_point = None;
    }

    /// Repaint the whole buffer with the background color.
    pub fn clear(&mut self) {
        self.pixmap.fill(self.config.background_color());
        self.has_ink = false;
        self.last_point = None;
    }

    /// Resize in place, keeping existing pixels anchored at the top-left.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Surface`] if either dimension is zero.
    pub fn resize(&mut self, width: u32, height: u32) -> RenderResult<()> {
        if width == self.width() && height == self.height() {
            return Ok(());
        }

        let mut resized = blank_pixmap(width, height, &self.config)?;
        resized.draw_pixmap(
            0,
            0,
            self.pixmap.as_ref(),
            &PixmapPaint {
                blend_mode: BlendMode::Source,
                ..PixmapPaint::default()
            },
            Transform::identity(),
            None,
        );

        tracing::debug!(
            "Surface resized {}x{} -> {}x{}",
            self.width(),
            self.height(),
            width,
            height
        );
        self.pixmap = resized;
        Ok(())
    }

    /// Route a viewport-space input event to the stroke operations.
    pub fn handle_event(&mut self, event: &InputEvent, rect: &BoundingRect) {
        match event {
            InputEvent::Pointer { x, y, phase } => {
                let point = rect.to_local(*x, *y);
                match phase {
                    PointerPhase::Down => self.start_stroke(point),
                    PointerPhase::Move => self.extend_stroke(point),
                    PointerPhase::Up | PointerPhase::Leave => self.end_stroke(),
                }
            }
            InputEvent::Touch(touch) => match touch.phase {
                TouchPhase::Start | TouchPhase::Move => {
                    let Some(primary) = touch.primary_touch() else {
                        return;
                    };
                    let point = rect.to_local(primary.x, primary.y);
                    if touch.phase == TouchPhase::Start {
                        self.start_stroke(point);
                    } else {
                        self.extend_stroke(point);
                    }
                }
                TouchPhase::End | TouchPhase::Cancel => self.end_stroke(),
            },
        }
    }

    /// Export the buffer as a JPEG still.
    ///
    /// Returns `Ok(None)` when nothing has been drawn.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Encode`] if JPEG encoding fails.
    pub fn export_still(&self) -> RenderResult<Option<StillImage>> {
        if !self.has_ink {
            return Ok(None);
        }

        let (width, height) = (self.width(), self.height());
        // Opaque buffer: premultiplied and straight RGB are identical.
        let rgb: Vec<u8> = self
            .pixmap
            .data()
            .chunks_exact(4)
            .flat_map(|px| [px[0], px[1], px[2]])
            .collect();

        let mut buf = std::io::Cursor::new(Vec::new());
        let encoder =
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, self.config.jpeg_quality);
        encoder
            .write_image(&rgb, width, height, image::ColorType::Rgb8.into())
            .map_err(|e| RenderError::Encode(format!("JPEG encoding failed: {e}")))?;

        let still = StillImage::from_bytes(buf.into_inner());
        tracing::debug!("Exported still {}x{} ({} bytes)", width, height, still.len());
        Ok(Some(still))
    }

    /// Export the buffer as lossless PNG bytes, regardless of ink.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Encode`] if PNG encoding fails.
    pub fn export_png(&self) -> RenderResult<Vec<u8>> {
        self.pixmap
            .encode_png()
            .map_err(|e| RenderError::Encode(format!("PNG encoding failed: {e}")))
    }

    /// Read back one pixel as straight RGBA.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.pixmap.pixel(x, y).map(|px| {
            let c = px.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
    }

    fn draw_segment(&mut self, from: Point, to: Point) {
        let mut pb = PathBuilder::new();
        pb.move_to(from.x, from.y);
        pb.line_to(to.x, to.y);
        let Some(path) = pb.finish() else {
            return;
        };

        let (color, width) = match self.tool {
            Tool::Pen => (self.config.foreground, self.config.pen_width),
            Tool::Eraser => (self.config.background, self.config.eraser_width),
        };

        let mut paint = Paint::default();
        paint.set_color_rgba8(color[0], color[1], color[2], 255);
        paint.anti_alias = true;

        let stroke = Stroke {
            width,
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..Stroke::default()
        };

        self.pixmap
            .stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    }
}

impl std::fmt::Debug for StrokeCanvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrokeCanvas")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("tool", &self.tool)
            .field("has_ink", &self.has_ink)
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}

fn blank_pixmap(width: u32, height: u32, config: &SurfaceConfig) -> RenderResult<Pixmap> {
    let mut pixmap = Pixmap::new(width, height).ok_or_else(|| {
        RenderError::Surface(format!("cannot create a {width}x{height} surface"))
    })?;
    pixmap.fill(config.background_color());
    Ok(pixmap)
}
