//! Draws a [`ChartLayout`] onto an RGB image

use ab_glyph::{FontRef, PxScale};
use image::{Rgb, RgbImage, imageops};
use imageproc::drawing::{
    draw_filled_rect_mut, draw_hollow_rect_mut, draw_line_segment_mut, draw_text_mut, text_size,
};
use imageproc::rect::Rect;

use super::layout::{Bar, ChartLayout};
use crate::error::RenderError;

/// DejaVu Sans, see `assets/fonts/DejaVu-LICENSE`
static FONT_DATA: &[u8] = include_bytes!("../../../assets/fonts/DejaVuSans.ttf");

pub(crate) const WIDTH: u32 = 1500;
pub(crate) const HEIGHT: u32 = 900;

const MARGIN_LEFT: i32 = 110;
const MARGIN_RIGHT: i32 = 330;
const MARGIN_TOP: i32 = 70;
const MARGIN_BOTTOM: i32 = 90;

const TICK_LEN: i32 = 6;
const HATCH_PERIOD: f32 = 10.0;

const TITLE_SIZE: f32 = 26.0;
const LABEL_SIZE: f32 = 18.0;
const VALUE_SIZE: f32 = 14.0;

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
const SWATCH_GRAY: Rgb<u8> = Rgb([128, 128, 128]);
const LEGEND_BORDER: Rgb<u8> = Rgb([200, 200, 200]);

const X_LABEL: &str = "Free Space (%)";
const LEGEND: [(&str, bool); 2] = [("Internal Free (%)", false), ("External Free (%)", true)];

/// Data-to-pixel mapping for the plot area
#[derive(Debug, Clone, Copy)]
pub(crate) struct Frame {
    left: i32,
    right: i32,
    top: i32,
    bottom: i32,
    y_min: f64,
    y_max: f64,
}

impl Frame {
    pub(crate) fn new(chart: &ChartLayout) -> Self {
        Self {
            left: MARGIN_LEFT,
            right: WIDTH as i32 - MARGIN_RIGHT,
            top: MARGIN_TOP,
            bottom: HEIGHT as i32 - MARGIN_BOTTOM,
            y_min: chart.y_min,
            y_max: chart.y_max,
        }
    }

    /// Pixel column of a percentage
    pub(crate) fn x(&self, percent: f64) -> i32 {
        self.left + (percent / 100.0 * f64::from(self.right - self.left)).round() as i32
    }

    /// Pixel row of a data-space y value (larger values are higher up)
    pub(crate) fn y(&self, value: f64) -> i32 {
        let span = (self.y_max - self.y_min).max(f64::EPSILON);
        let frac = (value - self.y_min) / span;
        self.bottom - (frac * f64::from(self.bottom - self.top)).round() as i32
    }
}

/// `Rect` spanning `[x0, x1) x [y0, y1)`, `None` when empty
fn span(x0: i32, y0: i32, x1: i32, y1: i32) -> Option<Rect> {
    (x1 > x0 && y1 > y0).then(|| Rect::at(x0, y0).of_size((x1 - x0) as u32, (y1 - y0) as u32))
}

/// A `width` by `height` tile in `fill` crossed by black diagonal lines
fn hatched_tile(width: u32, height: u32, fill: Rgb<u8>) -> RgbImage {
    let mut tile = RgbImage::from_pixel(width, height, fill);
    let (w, h) = (width as f32, height as f32);
    let mut offset = 0.0;
    while offset < w + h {
        for shift in [0.0, 1.0] {
            let x = offset + shift;
            draw_line_segment_mut(&mut tile, (x - h, h), (x, 0.0), BLACK);
        }
        offset += HATCH_PERIOD;
    }
    tile
}

struct Painter<'f> {
    img: RgbImage,
    font: FontRef<'f>,
}

impl Painter<'_> {
    fn fill(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Rgb<u8>) {
        if let Some(rect) = span(x0, y0, x1, y1) {
            draw_filled_rect_mut(&mut self.img, rect, color);
        }
    }

    fn hatch(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, fill: Rgb<u8>) {
        if let Some(rect) = span(x0, y0, x1, y1) {
            let tile = hatched_tile(rect.width(), rect.height(), fill);
            imageops::replace(&mut self.img, &tile, i64::from(x0), i64::from(y0));
        }
    }

    fn outline(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Rgb<u8>) {
        if let Some(rect) = span(x0, y0, x1, y1) {
            draw_hollow_rect_mut(&mut self.img, rect, color);
        }
    }

    fn text_width(&self, text: &str, size: f32) -> i32 {
        text_size(PxScale::from(size), &self.font, text).0 as i32
    }

    /// Draw `text` with its top-left corner at `(x, y)`
    fn text(&mut self, x: i32, y: i32, text: &str, size: f32) {
        draw_text_mut(&mut self.img, BLACK, x, y, PxScale::from(size), &self.font, text);
    }

    /// Draw `text` vertically centred on `y`
    fn text_centred_at(&mut self, x: i32, y: i32, text: &str, size: f32) {
        self.text(x, y - (size / 2.0).round() as i32, text, size);
    }

    fn draw_bar(&mut self, frame: &Frame, bar: &Bar) {
        let x0 = frame.x(0.0);
        let x1 = frame.x(f64::from(bar.value));
        let top = frame.y(bar.y + Bar::HEIGHT);
        let bottom = frame.y(bar.y);
        let color = Rgb(bar.severity.rgb());
        if x1 > x0 {
            if bar.hatched() {
                self.hatch(x0, top, x1, bottom, color);
            } else {
                self.fill(x0, top, x1, bottom, color);
            }
            self.outline(x0, top, x1 + 1, bottom + 1, BLACK);
        }
        self.text_centred_at(x1 + 4, frame.y(bar.center_y()), &bar.label(), VALUE_SIZE);
    }

    fn draw_axes(&mut self, frame: &Frame) {
        self.outline(frame.left, frame.top, frame.right + 1, frame.bottom + 1, BLACK);
        for percent in (0..=100).step_by(20) {
            let x = frame.x(f64::from(percent));
            self.fill(x, frame.bottom, x + 1, frame.bottom + TICK_LEN, BLACK);
            let label = percent.to_string();
            let half = self.text_width(&label, LABEL_SIZE) / 2;
            self.text(x - half, frame.bottom + TICK_LEN + 6, &label, LABEL_SIZE);
        }
        let half = self.text_width(X_LABEL, LABEL_SIZE) / 2;
        let center = (frame.left + frame.right) / 2;
        self.text(center - half, frame.bottom + TICK_LEN + 40, X_LABEL, LABEL_SIZE);
    }

    fn draw_legend(&mut self, frame: &Frame) {
        const SWATCH: i32 = 24;
        const ROW: i32 = 34;
        const PAD: i32 = 10;
        let label_width = LEGEND
            .iter()
            .map(|(label, _)| self.text_width(label, LABEL_SIZE))
            .max()
            .unwrap_or(0);
        let x0 = frame.right + 15;
        let y0 = frame.top;
        let x1 = x0 + PAD * 3 + SWATCH + label_width;
        let y1 = y0 + PAD * 2 + ROW * LEGEND.len() as i32 - (ROW - SWATCH);
        self.outline(x0, y0, x1, y1, LEGEND_BORDER);

        for (i, (label, hatched)) in LEGEND.iter().enumerate() {
            let sx = x0 + PAD;
            let sy = y0 + PAD + i as i32 * ROW;
            if *hatched {
                self.hatch(sx, sy, sx + SWATCH, sy + SWATCH, SWATCH_GRAY);
            } else {
                self.fill(sx, sy, sx + SWATCH, sy + SWATCH, SWATCH_GRAY);
            }
            self.text_centred_at(sx + SWATCH + PAD, sy + SWATCH / 2, label, LABEL_SIZE);
        }
    }

    fn draw_title(&mut self, title: &str) {
        let mut size = TITLE_SIZE;
        while size > LABEL_SIZE && self.text_width(title, size) > WIDTH as i32 - 40 {
            size -= 2.0;
        }
        let x = (WIDTH as i32 - self.text_width(title, size)) / 2;
        self.text_centred_at(x, MARGIN_TOP / 2, title, size);
    }
}

/// Render the complete figure
pub(crate) fn draw(chart: &ChartLayout, title: &str) -> Result<RgbImage, RenderError> {
    let font = FontRef::try_from_slice(FONT_DATA).map_err(|_| RenderError::Font)?;
    let mut painter = Painter {
        img: RgbImage::from_pixel(WIDTH, HEIGHT, WHITE),
        font,
    };
    let frame = Frame::new(chart);

    for row in &chart.rows {
        for bar in &row.bars {
            painter.draw_bar(&frame, bar);
        }
        let y = frame.y(row.tick_y());
        painter.fill(frame.left - TICK_LEN, y, frame.left, y + 1, BLACK);
        let width = painter.text_width(&row.site, LABEL_SIZE);
        painter.text_centred_at(frame.left - TICK_LEN - 6 - width, y, &row.site, LABEL_SIZE);
    }
    painter.draw_axes(&frame);
    painter.draw_legend(&frame);
    painter.draw_title(title);
    Ok(painter.img)
}
