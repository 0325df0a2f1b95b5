use std::fmt;

/// Horizontal link shape: a cubic Bézier from the source node's right edge to the
/// target node's left edge, with both control points at the horizontal midpoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkPath {
    pub source: (f64, f64),
    pub target: (f64, f64),
}

impl LinkPath {
    pub fn midpoint_x(&self) -> f64 {
        (self.source.0 + self.target.0) / 2.0
    }

    /// SVG path data, e.g. `M11,40C405,40,405,60,799,60`.
    pub fn to_svg_d(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for LinkPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (sx, y0) = self.source;
        let (tx, y1) = self.target;
        let mx = self.midpoint_x();
        write!(
            f,
            "M{},{}C{},{},{},{},{},{}",
            coord(sx),
            coord(y0),
            coord(mx),
            coord(y0),
            coord(mx),
            coord(y1),
            coord(tx),
            coord(y1)
        )
    }
}

// Avoid `-0`, `NaN` and float noise like `40.00000000001` in attribute values.
fn coord(v: f64) -> String {
    if !v.is_finite() {
        return "0".to_string();
    }
    let v = if v.abs() < 1e-9 { 0.0 } else { v };
    let rounded = (v * 1e6).round() / 1e6;
    format!("{}", rounded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_svg_path_data() {
        let path = LinkPath {
            source: (11.0, 40.0),
            target: (799.0, 60.5),
        };
        assert_eq!(path.to_svg_d(), "M11,40C405,40,405,60.5,799,60.5");
    }

    #[test]
    fn test_coordinates_are_cleaned() {
        let path = LinkPath {
            source: (-0.0, 1.0000000001),
            target: (2.0, f64::NAN),
        };
        assert_eq!(path.to_svg_d(), "M0,1C1,1,1,0,2,0");
    }
}
