use crate::chart::{self, ChartLayout, ChartRegion};
use crate::config::Config;
use crate::reconcile::Reconciled;
use crate::render::canvas::Canvas;
use crate::render::fonts::{FontSet, text_height, text_width};
use crate::render::palette::Palette;
use crate::tariff::types::GasPrice;
use chrono::NaiveDateTime;
use embedded_graphics::mono_font::MonoFont;
use image::RgbImage;

pub const TITLE: &str = "Octopus Energy";
const MARGIN: i32 = 5;
const BOX_TOP: i32 = 30;
const BOX_HEIGHT: i32 = 50;
const LABEL_PAD: i32 = 5;
const ALERT_DOT: u32 = 9;

/// Everything one frame shows
#[derive(Debug, Clone)]
pub struct DashboardView<'a> {
    pub now: NaiveDateTime,
    pub prices: Reconciled<'a>,
    pub gas: GasPrice,
    pub alert: bool,
    pub message: Option<&'a str>,
}

/// A rendered frame and the local time it shows
#[derive(Debug, Clone)]
pub struct Frame {
    pub image: RgbImage,
    pub rendered_at: NaiveDateTime,
}

/// Draws dashboard frames at a fixed canvas size
#[derive(Clone)]
pub struct DashboardRenderer {
    width: u32,
    height: u32,
    region: ChartRegion,
    palette: Palette,
    fonts: FontSet,
}

impl DashboardRenderer {
    pub fn from_config(config: &Config) -> Self {
        Self {
            width: config.display.width,
            height: config.display.height,
            region: ChartRegion::from(config.display.chart),
            palette: Palette::from(&config.palette),
            fonts: FontSet::from_config(&config.fonts),
        }
    }

    pub const fn region(&self) -> ChartRegion {
        self.region
    }

    pub const fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn render(&self, view: &DashboardView<'_>) -> Frame {
        let mut canvas = Canvas::new(self.width, self.height, self.palette.background);
        self.draw_header(&mut canvas, view);

        if view.prices.display_window.is_empty() {
            canvas.text(
                "Loading...",
                MARGIN * 2,
                self.height as i32 / 2,
                self.fonts.medium,
                self.palette.text,
            );
        } else {
            self.draw_boxes(&mut canvas, view);
            let layout = chart::layout(
                &view.prices.display_window,
                view.prices.current_slot,
                self.region,
            );
            self.draw_chart(&mut canvas, &layout, view);
        }

        Frame {
            image: canvas.into_image(),
            rendered_at: view.now,
        }
    }

    fn draw_header(&self, canvas: &mut Canvas, view: &DashboardView<'_>) {
        let width = self.width as i32;
        let clock = view.now.format("%H:%M").to_string();
        let clock_x = width - MARGIN - text_width(self.fonts.medium, &clock);
        canvas.text(&clock, clock_x, MARGIN, self.fonts.medium, self.palette.text);

        let mut title_limit = clock_x - MARGIN;
        if view.alert {
            let dot_x = clock_x - MARGIN - ALERT_DOT as i32;
            canvas.dot(dot_x, MARGIN + 2, ALERT_DOT, self.palette.alert);
            title_limit = dot_x - MARGIN;
        }

        let title = view.message.unwrap_or(TITLE);
        let title = truncate_to_width(self.fonts.medium, title, title_limit - MARGIN);
        canvas.text(&title, MARGIN, MARGIN, self.fonts.medium, self.palette.text);
    }

    fn draw_boxes(&self, canvas: &mut Canvas, view: &DashboardView<'_>) {
        let p = &self.palette;
        let f = &self.fonts;
        let width = self.width as i32;
        let third = width / 3;
        let bottom = BOX_TOP + BOX_HEIGHT;
        let half = BOX_HEIGHT / 2;

        // Now: price band colour, blue when the current slot has no price
        let current = view.prices.current_price();
        let now_color = current.map_or(p.blue, |price| p.price_color(price));
        canvas.fill_rect(MARGIN, BOX_TOP, third - 2, bottom, now_color);
        canvas.text("Now", MARGIN + LABEL_PAD, BOX_TOP + 3, f.small, p.box_label);
        if let Some(price) = current {
            self.price_text(canvas, price, MARGIN + LABEL_PAD, BOX_TOP + 16, f.xlarge, f.medium);
        }

        // Min over Max in the middle third
        let mid_x = third + 2;
        let mid_right = 2 * third - 2;
        let min = view.prices.min_price;
        let max = view.prices.max_price;
        canvas.fill_rect(mid_x, BOX_TOP, mid_right, BOX_TOP + half - 1, p.price_color(min));
        canvas.text("Min", mid_x + LABEL_PAD, BOX_TOP + 3, f.small, p.box_label);
        self.price_text(canvas, min, third + 35, BOX_TOP + 3, f.large, f.small);

        let max_top = BOX_TOP + half + 1;
        canvas.fill_rect(mid_x, max_top, mid_right, bottom, p.price_color(max));
        canvas.text("Max", mid_x + LABEL_PAD, max_top + 2, f.small, p.box_label);
        self.price_text(canvas, max, third + 35, max_top + 2, f.large, f.small);

        // Gas
        let gas_x = 2 * third + 2;
        canvas.fill_rect(gas_x, BOX_TOP, width - MARGIN, bottom, p.orange);
        canvas.text("Gas", gas_x + LABEL_PAD, BOX_TOP + 3, f.small, p.gas_label);
        if let Some(price) = view.gas.today {
            self.price_text(canvas, price, gas_x + LABEL_PAD, BOX_TOP + 16, f.xlarge, f.medium);
        }
        if view.prices.has_tomorrow()
            && let Some(tomorrow) = view.gas.tomorrow
        {
            let right = width - MARGIN - 3;
            let value = format_price(tomorrow);
            let x = right - text_width(f.medium, &value) - text_width(f.tiny, "p") - 1;
            let end = canvas.text(&value, x, BOX_TOP + 3, f.medium, p.gas_label);
            let suffix_y = BOX_TOP + 3 + text_height(f.medium) - text_height(f.tiny);
            canvas.text("p", end + 1, suffix_y, f.tiny, p.gas_label);
            let label_x = right - text_width(f.tiny, "Tmrw");
            canvas.text("Tmrw", label_x, BOX_TOP + 18, f.tiny, p.gas_tomorrow);
        }
    }

    fn draw_chart(&self, canvas: &mut Canvas, layout: &ChartLayout, view: &DashboardView<'_>) {
        let p = &self.palette;
        let f = &self.fonts;
        let region = self.region;

        if let Some(t) = layout.tomorrow {
            canvas.fill_rect(t.x, t.top, t.right, t.bottom, p.tomorrow_background);
        }

        for g in &layout.gridlines {
            canvas.line((region.left, g.y), (region.right, g.y), p.gridline);
            canvas.text(&g.value.to_string(), MARGIN, g.y - 4, f.tiny, p.axis_label);
        }

        for bar in &layout.bars {
            if bar.height() > 0 {
                canvas.fill_rect(bar.x, bar.top, bar.right, bar.bottom, p.price_color(bar.price));
            }
        }

        if let Some(marker) = &layout.current_marker {
            for &(y0, y1) in &marker.dashes {
                canvas.line((marker.x, y0), (marker.x, y1), p.marker);
            }
        }

        for label in &layout.hour_labels {
            canvas.text(&label.hour.to_string(), label.x, label.y, f.small, p.axis_label);
        }

        if let Some(t) = layout.tomorrow {
            canvas.text("Tmrw", t.label_x, t.label_y, f.medium, p.chart_label);
            if let Some(max) = view.prices.tomorrow_max {
                let value = format!("{}p", max.round() as i64);
                let right = region.right - 2;
                let label_x = right - text_width(f.small, "Max:");
                canvas.text("Max:", label_x, region.top + 5, f.small, p.chart_label);
                let value_x = right - text_width(f.large, &value);
                canvas.text(&value, value_x, region.top + 18, f.large, p.price_color(max));
            }
        }
    }

    /// Price in white with a smaller `p` suffix sharing its bottom edge
    fn price_text(
        &self,
        canvas: &mut Canvas,
        price: f64,
        x: i32,
        y: i32,
        font: &MonoFont<'_>,
        suffix: &MonoFont<'_>,
    ) {
        let color = self.palette.text;
        let end = canvas.text(&format_price(price), x, y, font, color);
        let suffix_y = y + text_height(font) - text_height(suffix);
        canvas.text("p", end + 1, suffix_y, suffix, color);
    }
}

/// One decimal place, as shown in the boxes
pub fn format_price(price: f64) -> String {
    format!("{:.1}", price)
}

/// Longest prefix of `text` that fits in `max_width` pixels
fn truncate_to_width(font: &MonoFont<'_>, text: &str, max_width: i32) -> String {
    if text_width(font, text) <= max_width {
        return text.to_string();
    }
    let advance = (font.character_size.width + font.character_spacing).max(1) as i32;
    let fit = usize::try_from(max_width / advance).unwrap_or(0);
    text.chars().take(fit).collect()
}
