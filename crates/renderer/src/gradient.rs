//! Color-ramp preview rendering for grid slices.

use radar_common::{RadarError, RadarResult};

/// Color value in RGBA format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn transparent() -> Self {
        Self {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        }
    }

    /// Parse "#RRGGBB" or "#RRGGBBAA".
    pub fn from_hex(s: &str) -> RadarResult<Self> {
        let hex = s.trim_start_matches('#');
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16)
                .map_err(|_| RadarError::render_failed(format!("invalid hex color: {}", s)))
        };

        match hex.len() {
            6 => Ok(Self::new(
                channel(0..2)?,
                channel(2..4)?,
                channel(4..6)?,
                255,
            )),
            8 => Ok(Self::new(
                channel(0..2)?,
                channel(2..4)?,
                channel(4..6)?,
                channel(6..8)?,
            )),
            _ => Err(RadarError::render_failed(format!(
                "invalid hex color: {}",
                s
            ))),
        }
    }
}

/// A gradient of evenly spaced color stops over normalized `[0, 1]`.
#[derive(Debug, Clone)]
pub struct ColorRamp {
    stops: Vec<Rgba>,
}

impl ColorRamp {
    pub fn new(stops: Vec<Rgba>) -> RadarResult<Self> {
        if stops.len() < 2 {
            return Err(RadarError::render_failed(
                "color ramp needs at least 2 stops",
            ));
        }
        Ok(Self { stops })
    }

    pub fn from_hex(stops: &[&str]) -> RadarResult<Self> {
        Self::new(stops.iter().map(|s| Rgba::from_hex(s)).collect::<RadarResult<Vec<_>>>()?)
    }

    /// Radar-style precipitation ramp: transparent through green, yellow,
    /// orange to red.
    pub fn precipitation() -> Self {
        Self::from_hex(&[
            "#00000000", "#7CFC00", "#32CD32", "#FFFF00", "#FF8C00", "#FF0000",
        ])
        .expect("builtin ramp is valid")
    }

    /// Sample the ramp at normalized position `t` (clamped to `[0, 1]`).
    pub fn sample(&self, t: f32) -> Rgba {
        let t = t.clamp(0.0, 1.0);
        let segments = (self.stops.len() - 1) as f32;
        let scaled = t * segments;
        let idx = (scaled.floor() as usize).min(self.stops.len() - 2);
        let frac = scaled - idx as f32;
        lerp(self.stops[idx], self.stops[idx + 1], frac)
    }
}

fn lerp(a: Rgba, b: Rgba, t: f32) -> Rgba {
    let t = t.clamp(0.0, 1.0);
    let mix = |x: u8, y: u8| -> u8 { (x as f32 * (1.0 - t) + y as f32 * t).round() as u8 };
    Rgba::new(mix(a.r, b.r), mix(a.g, b.g), mix(a.b, b.b), mix(a.a, b.a))
}

/// How one frame should be color mapped.
#[derive(Debug, Clone)]
pub struct RenderSpec {
    pub ramp: ColorRamp,
    /// Lower bound of the value scale; defaults to the data minimum.
    pub vmin: Option<f32>,
    /// Upper bound of the value scale; defaults to the data maximum.
    /// Supplying both bounds pins repeated frames onto one fixed scale.
    pub vmax: Option<f32>,
}

impl RenderSpec {
    pub fn new(ramp: ColorRamp) -> Self {
        Self {
            ramp,
            vmin: None,
            vmax: None,
        }
    }

    pub fn with_range(mut self, vmin: f32, vmax: f32) -> Self {
        self.vmin = Some(vmin);
        self.vmax = Some(vmax);
        self
    }
}

/// Render a `(lat, lon)` slice to RGBA pixels.
///
/// Output rows run north to south (row 0 is the northernmost latitude) to
/// match the conventional raster orientation; an ascending input latitude
/// axis is flipped. NaN cells become fully transparent.
pub fn render_preview(
    lats: &[f64],
    lons: &[f64],
    values: &[f32],
    spec: &RenderSpec,
) -> RadarResult<Vec<u8>> {
    let width = lons.len();
    let height = lats.len();
    if width == 0 || height == 0 || values.len() != width * height {
        return Err(RadarError::render_failed(format!(
            "frame buffer has {} values for a {}x{} grid",
            values.len(),
            width,
            height
        )));
    }

    let vmin = spec.vmin.unwrap_or_else(|| nan_min(values));
    let vmax = spec.vmax.unwrap_or_else(|| nan_max(values));
    if !vmin.is_finite() || !vmax.is_finite() {
        return Err(RadarError::render_failed(
            "frame contains no finite values and no explicit scale was given",
        ));
    }
    let range = vmax - vmin;
    let range = if range.abs() < 1e-6 { 1.0 } else { range };

    let ascending = lats[0] < lats[height - 1];

    let mut pixels = vec![0u8; width * height * 4];
    for row in 0..height {
        // Row 0 of the image is the northernmost latitude.
        let src_row = if ascending { height - 1 - row } else { row };
        for col in 0..width {
            let value = values[src_row * width + col];
            let color = if value.is_nan() {
                Rgba::transparent()
            } else {
                spec.ramp.sample((value - vmin) / range)
            };

            let offset = (row * width + col) * 4;
            pixels[offset] = color.r;
            pixels[offset + 1] = color.g;
            pixels[offset + 2] = color.b;
            pixels[offset + 3] = color.a;
        }
    }

    Ok(pixels)
}

fn nan_min(values: &[f32]) -> f32 {
    values
        .iter()
        .copied()
        .filter(|v| !v.is_nan())
        .fold(f32::INFINITY, f32::min)
}

fn nan_max(values: &[f32]) -> f32 {
    values
        .iter()
        .copied()
        .filter(|v| !v.is_nan())
        .fold(f32::NEG_INFINITY, f32::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_parsing() {
        assert_eq!(Rgba::from_hex("#FF8C00").unwrap(), Rgba::new(255, 140, 0, 255));
        assert_eq!(Rgba::from_hex("#00000000").unwrap(), Rgba::transparent());
        assert!(Rgba::from_hex("#F80").is_err());
        assert!(Rgba::from_hex("#GGGGGG").is_err());
    }

    #[test]
    fn test_ramp_endpoints_and_midpoint() {
        let ramp = ColorRamp::from_hex(&["#000000", "#FFFFFF"]).unwrap();
        assert_eq!(ramp.sample(0.0), Rgba::new(0, 0, 0, 255));
        assert_eq!(ramp.sample(1.0), Rgba::new(255, 255, 255, 255));
        assert_eq!(ramp.sample(0.5), Rgba::new(128, 128, 128, 255));
        // Out of range clamps.
        assert_eq!(ramp.sample(2.0), Rgba::new(255, 255, 255, 255));
    }

    #[test]
    fn test_preview_is_north_up() {
        // Ascending lats: the last input row is the northernmost and must
        // land on image row 0.
        let lats = [40.0, 41.0];
        let lons = [0.0, 1.0];
        let values = [0.0, 0.0, 1.0, 1.0]; // south row zeros, north row ones
        let spec = RenderSpec::new(ColorRamp::from_hex(&["#000000", "#FFFFFF"]).unwrap());

        let pixels = render_preview(&lats, &lons, &values, &spec).unwrap();
        // Image row 0 (north) should be white, row 1 (south) black.
        assert_eq!(&pixels[0..4], &[255, 255, 255, 255]);
        assert_eq!(&pixels[8..12], &[0, 0, 0, 255]);
    }

    #[test]
    fn test_nan_is_transparent() {
        let lats = [40.0, 41.0];
        let lons = [0.0, 1.0];
        let values = [f32::NAN, 1.0, 2.0, 3.0];
        let spec = RenderSpec::new(ColorRamp::precipitation());

        let pixels = render_preview(&lats, &lons, &values, &spec).unwrap();
        // NaN cell is at input (row 0, col 0) = image (row 1, col 0).
        assert_eq!(&pixels[8..12], &[0, 0, 0, 0]);
    }

    #[test]
    fn test_explicit_scale_overrides_data_range() {
        let lats = [40.0, 41.0];
        let lons = [0.0, 1.0];
        let values = [5.0, 5.0, 5.0, 5.0];
        let ramp = ColorRamp::from_hex(&["#000000", "#FFFFFF"]).unwrap();

        // Data range would normalize 5.0 to mid-ramp; a fixed scale pins it.
        let pinned = render_preview(
            &lats,
            &lons,
            &values,
            &RenderSpec::new(ramp.clone()).with_range(0.0, 10.0),
        )
        .unwrap();
        assert_eq!(&pinned[0..4], &[128, 128, 128, 255]);

        let auto = render_preview(&lats, &lons, &values, &RenderSpec::new(ramp)).unwrap();
        // Degenerate auto range guards to black at vmin.
        assert_eq!(&auto[0..4], &[0, 0, 0, 255]);
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let spec = RenderSpec::new(ColorRamp::precipitation());
        assert!(render_preview(&[40.0, 41.0], &[0.0, 1.0], &[1.0; 3], &spec).is_err());
    }
}
