//! Colour maps: value in `[0, 1]` to RGB, plus an ASCII intensity ramp.

use clap::ValueEnum;

/// Darkest to brightest.
const RAMP: &[u8] = b" .:-=+*#%@";

/// Viridis anchor colours at t = 0, 0.125, ..., 1.
const VIRIDIS: [(u8, u8, u8); 9] = [
    (68, 1, 84),
    (71, 44, 122),
    (59, 81, 139),
    (44, 113, 142),
    (33, 144, 141),
    (39, 173, 129),
    (92, 200, 99),
    (170, 220, 50),
    (253, 231, 37),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Colormap {
    #[default]
    Gray,
    #[value(name = "gray_r")]
    GrayR,
    Viridis,
    Hot,
}

impl Colormap {
    pub fn rgb(self, t: f64) -> (u8, u8, u8) {
        let t = clamp_unit(t);
        match self {
            Colormap::Gray => {
                let v = to_byte(t);
                (v, v, v)
            }
            Colormap::GrayR => {
                let v = to_byte(1.0 - t);
                (v, v, v)
            }
            Colormap::Viridis => {
                let x = t * (VIRIDIS.len() - 1) as f64;
                let i = (x.floor() as usize).min(VIRIDIS.len() - 2);
                let f = x - i as f64;
                let (a, b) = (VIRIDIS[i], VIRIDIS[i + 1]);
                (lerp(a.0, b.0, f), lerp(a.1, b.1, f), lerp(a.2, b.2, f))
            }
            Colormap::Hot => (
                to_byte(t / 0.365),
                to_byte((t - 0.365) / 0.381),
                to_byte((t - 0.746) / 0.254),
            ),
        }
    }

    /// ASCII glyph whose visual weight follows the map's brightness.
    pub fn glyph(self, t: f64) -> char {
        let t = match self {
            Colormap::GrayR => 1.0 - clamp_unit(t),
            _ => clamp_unit(t),
        };
        let i = (t * (RAMP.len() - 1) as f64).round() as usize;
        RAMP[i.min(RAMP.len() - 1)] as char
    }
}

/// Map `v` into `[0, 1]` relative to `[vmin, vmax]`. NaN maps to 0.
pub fn normalize(v: f64, vmin: f64, vmax: f64) -> f64 {
    if !v.is_finite() || vmax <= vmin {
        return 0.0;
    }
    clamp_unit((v - vmin) / (vmax - vmin))
}

fn clamp_unit(t: f64) -> f64 {
    if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) }
}

fn to_byte(t: f64) -> u8 {
    (clamp_unit(t) * 255.0).round() as u8
}

fn lerp(a: u8, b: u8, f: f64) -> u8 {
    (a as f64 + (b as f64 - a as f64) * f).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gray_endpoints() {
        assert_eq!(Colormap::Gray.rgb(0.0), (0, 0, 0));
        assert_eq!(Colormap::Gray.rgb(1.0), (255, 255, 255));
        assert_eq!(Colormap::GrayR.rgb(0.0), (255, 255, 255));
    }

    #[test]
    fn viridis_endpoints_match_anchors() {
        assert_eq!(Colormap::Viridis.rgb(0.0), VIRIDIS[0]);
        assert_eq!(Colormap::Viridis.rgb(1.0), VIRIDIS[8]);
    }

    #[test]
    fn hot_goes_black_to_white() {
        assert_eq!(Colormap::Hot.rgb(0.0), (0, 0, 0));
        assert_eq!(Colormap::Hot.rgb(1.0), (255, 255, 255));
        let (r, g, b) = Colormap::Hot.rgb(0.3);
        assert!(r > 150 && g == 0 && b == 0);
    }

    #[test]
    fn glyph_ramp_is_reversed_for_gray_r() {
        assert_eq!(Colormap::Gray.glyph(0.0), ' ');
        assert_eq!(Colormap::Gray.glyph(1.0), '@');
        assert_eq!(Colormap::GrayR.glyph(1.0), ' ');
    }

    #[test]
    fn normalize_handles_flat_range() {
        assert_eq!(normalize(3.0, 3.0, 3.0), 0.0);
        assert_eq!(normalize(5.0, 0.0, 10.0), 0.5);
        assert_eq!(normalize(-1.0, 0.0, 10.0), 0.0);
    }
}
