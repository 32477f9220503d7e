use crate::config::{PaletteConfig, PriceThresholds, Rgb};
use embedded_graphics::pixelcolor::Rgb888;

/// Resolved dashboard colours
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub background: Rgb888,
    pub text: Rgb888,
    pub box_label: Rgb888,
    pub green: Rgb888,
    pub blue: Rgb888,
    pub yellow: Rgb888,
    pub red: Rgb888,
    pub orange: Rgb888,
    pub gas_label: Rgb888,
    pub gas_tomorrow: Rgb888,
    pub tomorrow_background: Rgb888,
    pub gridline: Rgb888,
    pub axis_label: Rgb888,
    pub chart_label: Rgb888,
    pub marker: Rgb888,
    pub alert: Rgb888,
    thresholds: PriceThresholds,
}

const fn rgb(c: Rgb) -> Rgb888 {
    Rgb888::new(c[0], c[1], c[2])
}

impl From<&PaletteConfig> for Palette {
    fn from(c: &PaletteConfig) -> Self {
        Self {
            background: rgb(c.background),
            text: rgb(c.text),
            box_label: rgb(c.box_label),
            green: rgb(c.green),
            blue: rgb(c.blue),
            yellow: rgb(c.yellow),
            red: rgb(c.red),
            orange: rgb(c.orange),
            gas_label: rgb(c.gas_label),
            gas_tomorrow: rgb(c.gas_tomorrow),
            tomorrow_background: rgb(c.tomorrow_background),
            gridline: rgb(c.gridline),
            axis_label: rgb(c.axis_label),
            chart_label: rgb(c.chart_label),
            marker: rgb(c.marker),
            alert: rgb(c.alert),
            thresholds: c.thresholds,
        }
    }
}

impl Palette {
    /// Colour band for a unit price: green, blue, yellow, then red
    pub fn price_color(&self, price: f64) -> Rgb888 {
        let t = &self.thresholds;
        if price < t.cheap {
            self.green
        } else if price < t.normal {
            self.blue
        } else if price < t.expensive {
            self.yellow
        } else {
            self.red
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_bands() {
        let p = Palette::from(&PaletteConfig::default());
        assert_eq!(p.price_color(-2.0), p.green);
        assert_eq!(p.price_color(9.99), p.green);
        assert_eq!(p.price_color(10.0), p.blue);
        assert_eq!(p.price_color(34.9), p.yellow);
        assert_eq!(p.price_color(35.0), p.red);
    }
}
