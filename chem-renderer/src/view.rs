//! Result presentation: view model and SVG layout.
//!
//! The view model fixes which sections are shown for a result; the
//! [`ViewRenderer`] lays them out at a given width and theme.

use std::fmt::Write;

use chem_core::{AnalysisResult, Theme};
use serde::Serialize;

/// Which part of the result card a section represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    /// Overview paragraph.
    Summary,
    /// Everyday analogy callout.
    Analogy,
    /// Key properties list.
    KeyPoints,
    /// Reactions or uses list.
    ReactionsOrUses,
    /// Curriculum context callout.
    CurriculumContext,
    /// Fun facts grid.
    FunFacts,
}

impl SectionKind {
    /// Heading shown above the section.
    #[must_use]
    pub fn heading(self) -> &'static str {
        match self {
            Self::Summary => "Summary",
            Self::Analogy => "Think of it like this",
            Self::KeyPoints => "Key Properties",
            Self::ReactionsOrUses => "Reactions & Uses",
            Self::CurriculumContext => "In Your Curriculum",
            Self::FunFacts => "Fun Facts",
        }
    }
}

/// Section body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "content", rename_all = "snake_case")]
pub enum SectionBody {
    /// A single paragraph.
    Paragraph(String),
    /// An ordered list of items.
    List(Vec<String>),
}

/// One renderable section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    /// Section kind.
    pub kind: SectionKind,
    /// Section body.
    pub body: SectionBody,
}

/// Presentation model for one analysis result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultView {
    /// Display name.
    pub title: String,
    /// Molecular formula.
    pub formula: String,
    /// IUPAC name, only when it differs from the display name.
    pub iupac_alias: Option<String>,
    /// Overview paragraph.
    pub summary: String,
    /// Analogy, when non-empty.
    pub analogy: Option<String>,
    /// Key properties.
    pub key_points: Vec<String>,
    /// Reactions or uses.
    pub reactions_or_uses: Vec<String>,
    /// Curriculum context.
    pub curriculum_context: String,
    /// Fun facts; the grid is omitted when empty.
    pub fun_facts: Vec<String>,
}

impl ResultView {
    /// Build the view for a result.
    #[must_use]
    pub fn from_result(result: &AnalysisResult) -> Self {
        let iupac = result.iupac_name.trim();
        let iupac_alias = (!iupac.is_empty() && !iupac.eq_ignore_ascii_case(result.name.trim()))
            .then(|| iupac.to_string());
        let analogy = Some(result.analogy.trim())
            .filter(|a| !a.is_empty())
            .map(ToString::to_string);

        Self {
            title: result.name.clone(),
            formula: result.molecular_formula.clone(),
            iupac_alias,
            summary: result.summary.clone(),
            analogy,
            key_points: result.key_points.clone(),
            reactions_or_uses: result.reactions_or_uses.clone(),
            curriculum_context: result.curriculum_context.clone(),
            fun_facts: result.fun_facts.clone(),
        }
    }

    /// Sections in display order. Optional sections are left out when empty.
    #[must_use]
    pub fn sections(&self) -> Vec<Section> {
        let mut sections = vec![Section {
            kind: SectionKind::Summary,
            body: SectionBody::Paragraph(self.summary.clone()),
        }];
        if let Some(analogy) = &self.analogy {
            sections.push(Section {
                kind: SectionKind::Analogy,
                body: SectionBody::Paragraph(analogy.clone()),
            });
        }
        sections.push(Section {
            kind: SectionKind::KeyPoints,
            body: SectionBody::List(self.key_points.clone()),
        });
        sections.push(Section {
            kind: SectionKind::ReactionsOrUses,
            body: SectionBody::List(self.reactions_or_uses.clone()),
        });
        sections.push(Section {
            kind: SectionKind::CurriculumContext,
            body: SectionBody::Paragraph(self.curriculum_context.clone()),
        });
        if !self.fun_facts.is_empty() {
            sections.push(Section {
                kind: SectionKind::FunFacts,
                body: SectionBody::List(self.fun_facts.clone()),
            });
        }
        sections
    }

    /// Plain-text rendering for terminals.
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{} ({})", self.title, self.formula);
        if let Some(alias) = &self.iupac_alias {
            let _ = writeln!(out, "IUPAC: {alias}");
        }
        for section in self.sections() {
            let _ = writeln!(out, "\n## {}", section.kind.heading());
            match section.body {
                SectionBody::Paragraph(text) => {
                    let _ = writeln!(out, "{text}");
                }
                SectionBody::List(items) => {
                    for item in items {
                        let _ = writeln!(out, "- {item}");
                    }
                }
            }
        }
        out
    }
}

/// Colors for one theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    /// Page background.
    pub background: &'static str,
    /// Body text.
    pub text: &'static str,
    /// Secondary text.
    pub muted: &'static str,
    /// Headings and bullets.
    pub accent: &'static str,
    /// Callout fill.
    pub callout: &'static str,
    /// Card and callout border.
    pub border: &'static str,
}

impl Palette {
    /// Palette for a theme.
    #[must_use]
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => Self {
                background: "#ffffff",
                text: "#1f2937",
                muted: "#6b7280",
                accent: "#4f46e5",
                callout: "#eef2ff",
                border: "#c7d2fe",
            },
            Theme::Dark => Self {
                background: "#111827",
                text: "#f3f4f6",
                muted: "#9ca3af",
                accent: "#818cf8",
                callout: "#1e1b4b",
                border: "#3730a3",
            },
        }
    }
}

const PADDING: f32 = 32.0;
const GAP: f32 = 24.0;
const BODY_SIZE: f32 = 14.0;
const HEADING_SIZE: f32 = 16.0;
const TITLE_SIZE: f32 = 28.0;
const LINE_HEIGHT: f32 = 1.5;
const CALLOUT_PAD: f32 = 14.0;
// Average glyph advance as a fraction of the font size for sans-serif text.
const GLYPH_ADVANCE: f32 = 0.55;

/// Lays a [`ResultView`] out as SVG.
#[derive(Debug, Clone, Copy)]
pub struct ViewRenderer {
    /// Layout width in CSS pixels.
    pub width: u32,
    /// Theme to paint with.
    pub theme: Theme,
    /// Output scale factor (e.g. 2.0 for retina).
    pub scale: f32,
}

impl Default for ViewRenderer {
    fn default() -> Self {
        Self {
            width: 794,
            theme: Theme::Light,
            scale: 1.0,
        }
    }
}

impl ViewRenderer {
    /// Render the view to an SVG document sized to its content.
    #[must_use]
    #[allow(clippy::cast_precision_loss, clippy::too_many_lines)]
    pub fn render_svg(&self, view: &ResultView) -> String {
        let palette = Palette::for_theme(self.theme);
        let width = self.width as f32;
        let content_w = width - PADDING * 2.0;
        let mut body = String::with_capacity(8192);
        let mut y = PADDING;

        // Header
        y += TITLE_SIZE;
        push_text(&mut body, PADDING, y, TITLE_SIZE, palette.text, true, &view.title);
        y += 8.0;
        let formula_line = match &view.iupac_alias {
            Some(alias) => format!("{}  ·  {}", view.formula, alias),
            None => view.formula.clone(),
        };
        for line in wrap_text(&formula_line, chars_per_line(content_w, HEADING_SIZE)) {
            y += HEADING_SIZE * LINE_HEIGHT;
            push_text(&mut body, PADDING, y, HEADING_SIZE, palette.muted, false, &line);
        }
        y += GAP;

        // Summary
        y = heading(&mut body, PADDING, y, SectionKind::Summary, &palette);
        y = paragraph(&mut body, PADDING, y, content_w, &view.summary, palette.text);
        y += GAP;

        // Analogy callout
        if let Some(analogy) = &view.analogy {
            y = callout(
                &mut body,
                PADDING,
                y,
                content_w,
                SectionKind::Analogy,
                analogy,
                &palette,
            );
            y += GAP;
        }

        // Parallel lists
        let col_w = (content_w - GAP) / 2.0;
        let left_end = bullet_list(
            &mut body,
            PADDING,
            y,
            col_w,
            SectionKind::KeyPoints,
            &view.key_points,
            &palette,
        );
        let right_end = bullet_list(
            &mut body,
            PADDING + col_w + GAP,
            y,
            col_w,
            SectionKind::ReactionsOrUses,
            &view.reactions_or_uses,
            &palette,
        );
        y = left_end.max(right_end) + GAP;

        // Curriculum callout
        y = callout(
            &mut body,
            PADDING,
            y,
            content_w,
            SectionKind::CurriculumContext,
            &view.curriculum_context,
            &palette,
        );

        // Fun facts grid, two cards per row
        if !view.fun_facts.is_empty() {
            y += GAP;
            y = heading(&mut body, PADDING, y, SectionKind::FunFacts, &palette);
            for row in view.fun_facts.chunks(2) {
                let row_h = row
                    .iter()
                    .map(|fact| card_height(col_w, fact))
                    .fold(0.0_f32, f32::max);
                for (i, fact) in row.iter().enumerate() {
                    let x = PADDING + (i as f32) * (col_w + GAP);
                    card(&mut body, x, y, col_w, row_h, fact, &palette);
                }
                y += row_h + GAP / 2.0;
            }
        }

        let height = (y + PADDING).ceil();
        let out_w = (width * self.scale).round();
        let out_h = (height * self.scale).round();

        let mut svg = String::with_capacity(body.len() + 256);
        let _ = write!(
            svg,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{out_w}\" height=\"{out_h}\" viewBox=\"0 0 {width} {height}\">",
        );
        let _ = write!(
            svg,
            "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
            palette.background
        );
        svg.push_str(&body);
        svg.push_str("</svg>");
        svg
    }

    /// Render the view to PNG bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if rasterisation or encoding fails.
    #[cfg(feature = "export")]
    pub fn render_png(&self, view: &ResultView) -> crate::RenderResult<Vec<u8>> {
        let pixmap = crate::export::rasterize_svg(&self.render_svg(view))?;
        pixmap
            .encode_png()
            .map_err(|e| crate::RenderError::Encode(format!("PNG encoding failed: {e}")))
    }
}

fn heading(svg: &mut String, x: f32, y: f32, kind: SectionKind, palette: &Palette) -> f32 {
    let y = y + HEADING_SIZE;
    push_text(svg, x, y, HEADING_SIZE, palette.accent, true, kind.heading());
    y + 6.0
}

fn paragraph(svg: &mut String, x: f32, mut y: f32, width: f32, text: &str, color: &str) -> f32 {
    for line in wrap_text(text, chars_per_line(width, BODY_SIZE)) {
        y += BODY_SIZE * LINE_HEIGHT;
        push_text(svg, x, y, BODY_SIZE, color, false, &line);
    }
    y
}

fn callout(
    svg: &mut String,
    x: f32,
    y: f32,
    width: f32,
    kind: SectionKind,
    text: &str,
    palette: &Palette,
) -> f32 {
    let inner_w = width - CALLOUT_PAD * 2.0;
    let lines = wrap_text(text, chars_per_line(inner_w, BODY_SIZE)).len();
    #[allow(clippy::cast_precision_loss)]
    let height =
        CALLOUT_PAD * 2.0 + HEADING_SIZE + 6.0 + lines as f32 * BODY_SIZE * LINE_HEIGHT + 4.0;
    let _ = write!(
        svg,
        "<rect x=\"{x}\" y=\"{y}\" width=\"{width}\" height=\"{height}\" rx=\"10\" fill=\"{}\" stroke=\"{}\" stroke-width=\"1\"/>",
        palette.callout, palette.border,
    );
    let inner_y = heading(svg, x + CALLOUT_PAD, y + CALLOUT_PAD, kind, palette);
    paragraph(svg, x + CALLOUT_PAD, inner_y, inner_w, text, palette.text);
    y + height
}

fn bullet_list(
    svg: &mut String,
    x: f32,
    y: f32,
    width: f32,
    kind: SectionKind,
    items: &[String],
    palette: &Palette,
) -> f32 {
    let mut y = heading(svg, x, y, kind, palette);
    let indent = 16.0;
    for item in items {
        let first_line_y = y + BODY_SIZE * LINE_HEIGHT;
        let _ = write!(
            svg,
            "<circle cx=\"{}\" cy=\"{}\" r=\"3\" fill=\"{}\"/>",
            x + 4.0,
            first_line_y - BODY_SIZE * 0.35,
            palette.accent,
        );
        y = paragraph(svg, x + indent, y, width - indent, item, palette.text);
        y += 4.0;
    }
    y
}

fn card_height(width: f32, text: &str) -> f32 {
    let lines = wrap_text(text, chars_per_line(width - CALLOUT_PAD * 2.0, BODY_SIZE)).len();
    #[allow(clippy::cast_precision_loss)]
    let text_h = lines as f32 * BODY_SIZE * LINE_HEIGHT;
    CALLOUT_PAD * 2.0 + text_h
}

fn card(svg: &mut String, x: f32, y: f32, width: f32, height: f32, text: &str, palette: &Palette) {
    let _ = write!(
        svg,
        "<rect x=\"{x}\" y=\"{y}\" width=\"{width}\" height=\"{height}\" rx=\"8\" fill=\"none\" stroke=\"{}\" stroke-width=\"1\"/>",
        palette.border,
    );
    paragraph(
        svg,
        x + CALLOUT_PAD,
        y + CALLOUT_PAD - BODY_SIZE * (LINE_HEIGHT - 1.0),
        width - CALLOUT_PAD * 2.0,
        text,
        palette.text,
    );
}

fn push_text(svg: &mut String, x: f32, y: f32, size: f32, color: &str, bold: bool, text: &str) {
    let weight = if bold { "bold" } else { "normal" };
    let _ = write!(
        svg,
        "<text x=\"{x}\" y=\"{y}\" font-size=\"{size}\" font-weight=\"{weight}\" fill=\"{color}\" font-family=\"sans-serif\">{}</text>",
        escape_xml(text),
    );
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn chars_per_line(width: f32, font_size: f32) -> usize {
    ((width / (font_size * GLYPH_ADVANCE)).floor() as usize).max(8)
}

/// Greedy word wrap. Words longer than a line are split.
#[must_use]
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > max_chars {
            if current_len > 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let rest = word.split_off(max_chars);
            lines.push(word.into_iter().collect());
            word = rest;
        }
        if word.is_empty() {
            continue;
        }

        let needed = if current_len == 0 {
            word.len()
        } else {
            current_len + 1 + word.len()
        };
        if needed > max_chars {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.extend(word.iter());
        current_len += word.len();
    }

    if current_len > 0 {
        lines.push(current);
    }
    lines
}

/// Escape special XML characters and drop control characters XML forbids.
fn escape_xml(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\t' | '\n' | '\r' => out.push(c),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    out
}
