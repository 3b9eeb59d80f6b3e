//! Color values as the panel edits them: hex/rgb parsing, hsv conversion
//! for the picker, and the linear-gradient stop model.
//!
//! Computed style hands back `rgb(...)`/`rgba(...)` strings regardless of
//! how a color was authored, so everything funnels through [`Rgba`] and
//! renders back out as lowercase hex (or `rgba()` when translucent).

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    /// 0.0..=1.0
    pub a: f64,
}

impl Rgba {
    pub fn opaque(r: u8, g: u8, b: u8) -> Self {
        Rgba { r, g, b, a: 1.0 }
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub fn to_css(&self) -> String {
        if (self.a - 1.0).abs() < f64::EPSILON {
            self.to_hex()
        } else {
            format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
        }
    }
}

fn hex_pair(s: &str) -> Option<u8> {
    u8::from_str_radix(s, 16).ok()
}

fn parse_hex(s: &str) -> Option<Rgba> {
    let digits = s.strip_prefix('#')?;
    match digits.len() {
        3 => {
            let mut chars = digits.chars();
            let r = chars.next()?;
            let g = chars.next()?;
            let b = chars.next()?;
            Some(Rgba {
                r: hex_pair(&format!("{r}{r}"))?,
                g: hex_pair(&format!("{g}{g}"))?,
                b: hex_pair(&format!("{b}{b}"))?,
                a: 1.0,
            })
        }
        6 => Some(Rgba {
            r: hex_pair(&digits[0..2])?,
            g: hex_pair(&digits[2..4])?,
            b: hex_pair(&digits[4..6])?,
            a: 1.0,
        }),
        8 => Some(Rgba {
            r: hex_pair(&digits[0..2])?,
            g: hex_pair(&digits[2..4])?,
            b: hex_pair(&digits[4..6])?,
            a: hex_pair(&digits[6..8])? as f64 / 255.0,
        }),
        _ => None,
    }
}

fn parse_rgb_function(s: &str) -> Option<Rgba> {
    let inner = s
        .strip_prefix("rgba(")
        .or_else(|| s.strip_prefix("rgb("))?
        .strip_suffix(')')?;
    let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
    if parts.len() < 3 {
        return None;
    }
    let channel = |v: &str| -> Option<u8> {
        let n: f64 = v.parse().ok()?;
        Some(n.clamp(0.0, 255.0).round() as u8)
    };
    let a = if parts.len() > 3 {
        parts[3].parse::<f64>().ok()?.clamp(0.0, 1.0)
    } else {
        1.0
    };
    Some(Rgba {
        r: channel(parts[0])?,
        g: channel(parts[1])?,
        b: channel(parts[2])?,
        a,
    })
}

/// Parse the color forms the editor actually meets: hex from authored
/// attributes, `rgb()`/`rgba()` from computed style.
pub fn parse_css_color(s: &str) -> Option<Rgba> {
    let s = s.trim();
    if s.starts_with('#') {
        parse_hex(s)
    } else if s.starts_with("rgb") {
        parse_rgb_function(s)
    } else if s == "transparent" {
        Some(Rgba {
            r: 0,
            g: 0,
            b: 0,
            a: 0.0,
        })
    } else {
        None
    }
}

/// Hue 0..360, saturation/value 0..1.
pub fn rgb_to_hsv(color: Rgba) -> (f64, f64, f64) {
    let r = color.r as f64 / 255.0;
    let g = color.g as f64 / 255.0;
    let b = color.b as f64 / 255.0;
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;
    let hue = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * (((g - b) / delta).rem_euclid(6.0))
    } else if max == g {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };
    let saturation = if max == 0.0 { 0.0 } else { delta / max };
    (hue, saturation, max)
}

pub fn hsv_to_rgb(hue: f64, saturation: f64, value: f64) -> Rgba {
    let hue = hue.rem_euclid(360.0);
    let c = value * saturation;
    let x = c * (1.0 - ((hue / 60.0).rem_euclid(2.0) - 1.0).abs());
    let m = value - c;
    let (r, g, b) = match hue as u32 {
        0..=59 => (c, x, 0.0),
        60..=119 => (x, c, 0.0),
        120..=179 => (0.0, c, x),
        180..=239 => (0.0, x, c),
        240..=299 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    Rgba {
        r: ((r + m) * 255.0).round() as u8,
        g: ((g + m) * 255.0).round() as u8,
        b: ((b + m) * 255.0).round() as u8,
        a: 1.0,
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct GradientStop {
    pub color: Rgba,
    /// 0..100
    pub position: f64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Gradient {
    pub angle_deg: f64,
    pub stops: Vec<GradientStop>,
}

impl Gradient {
    /// Two-stop default the panel starts from.
    pub fn simple(from: Rgba, to: Rgba) -> Self {
        Gradient {
            angle_deg: 180.0,
            stops: vec![
                GradientStop {
                    color: from,
                    position: 0.0,
                },
                GradientStop {
                    color: to,
                    position: 100.0,
                },
            ],
        }
    }

    pub fn to_css(&self) -> String {
        let stops: Vec<String> = self
            .stops
            .iter()
            .map(|stop| format!("{} {}%", stop.color.to_css(), stop.position))
            .collect();
        format!("linear-gradient({}deg, {})", self.angle_deg, stops.join(", "))
    }
}

/// Split on commas that are not inside parentheses, so `rgb(1, 2, 3)` stays
/// one piece.
fn split_top_level(s: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth = 0u32;
    let mut current = String::new();
    for ch in s.chars() {
        match ch {
            '(' => {
                depth += 1;
                current.push(ch);
            }
            ')' => {
                depth = depth.saturating_sub(1);
                current.push(ch);
            }
            ',' if depth == 0 => {
                parts.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    if !current.trim().is_empty() {
        parts.push(current.trim().to_string());
    }
    parts
}

fn parse_angle(part: &str) -> Option<f64> {
    if let Some(deg) = part.strip_suffix("deg") {
        return deg.trim().parse().ok();
    }
    match part {
        "to top" => Some(0.0),
        "to right" => Some(90.0),
        "to bottom" => Some(180.0),
        "to left" => Some(270.0),
        _ => None,
    }
}

/// Parse a `linear-gradient(...)` string back into the stop model. Stops
/// without an explicit position are spread evenly.
pub fn parse_linear_gradient(css: &str) -> Option<Gradient> {
    let inner = css
        .trim()
        .strip_prefix("linear-gradient(")?
        .strip_suffix(')')?;
    let parts = split_top_level(inner);
    if parts.is_empty() {
        return None;
    }

    let (angle, stop_parts) = match parse_angle(&parts[0]) {
        Some(angle) => (angle, &parts[1..]),
        None => (180.0, &parts[..]),
    };
    if stop_parts.len() < 2 {
        return None;
    }

    let mut stops = Vec::with_capacity(stop_parts.len());
    for (index, part) in stop_parts.iter().enumerate() {
        let (color_str, position) = match part.rsplit_once(' ') {
            Some((color, pos)) if pos.ends_with('%') => {
                let value: f64 = pos.trim_end_matches('%').parse().ok()?;
                (color.trim(), Some(value))
            }
            _ => (part.as_str(), None),
        };
        let color = parse_css_color(color_str)?;
        let position = position.unwrap_or_else(|| {
            100.0 * index as f64 / (stop_parts.len() - 1).max(1) as f64
        });
        stops.push(GradientStop { color, position });
    }
    Some(Gradient {
        angle_deg: angle,
        stops,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_forms() {
        assert_eq!(parse_css_color("#ff0000"), Some(Rgba::opaque(255, 0, 0)));
        assert_eq!(parse_css_color("#f00"), Some(Rgba::opaque(255, 0, 0)));
        let with_alpha = parse_css_color("#ff000080").unwrap();
        assert_eq!((with_alpha.r, with_alpha.g, with_alpha.b), (255, 0, 0));
        assert!((with_alpha.a - 128.0 / 255.0).abs() < 1e-9);
    }

    #[test]
    fn test_parse_computed_rgb() {
        assert_eq!(
            parse_css_color("rgb(255, 128, 0)"),
            Some(Rgba::opaque(255, 128, 0))
        );
        let translucent = parse_css_color("rgba(0, 0, 255, 0.5)").unwrap();
        assert_eq!(translucent.b, 255);
        assert!((translucent.a - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_hex_round_trip() {
        let color = parse_css_color("rgb(18, 52, 86)").unwrap();
        assert_eq!(color.to_hex(), "#123456");
    }

    #[test]
    fn test_hsv_round_trip_primaries() {
        for color in [
            Rgba::opaque(255, 0, 0),
            Rgba::opaque(0, 255, 0),
            Rgba::opaque(0, 0, 255),
            Rgba::opaque(128, 64, 32),
        ] {
            let (h, s, v) = rgb_to_hsv(color);
            let back = hsv_to_rgb(h, s, v);
            assert!((back.r as i32 - color.r as i32).abs() <= 1);
            assert!((back.g as i32 - color.g as i32).abs() <= 1);
            assert!((back.b as i32 - color.b as i32).abs() <= 1);
        }
    }

    #[test]
    fn test_parse_gradient_with_rgb_stop() {
        let gradient =
            parse_linear_gradient("linear-gradient(90deg, rgb(255, 0, 0) 0%, #0000ff 100%)")
                .unwrap();
        assert_eq!(gradient.angle_deg, 90.0);
        assert_eq!(gradient.stops.len(), 2);
        assert_eq!(gradient.stops[0].color, Rgba::opaque(255, 0, 0));
        assert_eq!(gradient.stops[1].position, 100.0);
    }

    #[test]
    fn test_parse_gradient_without_positions_distributes() {
        let gradient =
            parse_linear_gradient("linear-gradient(#ff0000, #00ff00, #0000ff)").unwrap();
        assert_eq!(gradient.angle_deg, 180.0);
        assert_eq!(gradient.stops[0].position, 0.0);
        assert_eq!(gradient.stops[1].position, 50.0);
        assert_eq!(gradient.stops[2].position, 100.0);
    }

    #[test]
    fn test_gradient_css_round_trip() {
        let gradient = Gradient::simple(Rgba::opaque(255, 0, 0), Rgba::opaque(0, 0, 255));
        let css = gradient.to_css();
        assert_eq!(css, "linear-gradient(180deg, #ff0000 0%, #0000ff 100%)");
        assert_eq!(parse_linear_gradient(&css), Some(gradient));
    }
}
