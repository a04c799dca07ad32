//! Reference glyph loading.
//!
//! Fetches the canonical stroke paths for a target character from a KanjiVG
//! style data source: one SVG document per character, addressed by the
//! character's Unicode code point as a 5-digit lowercase hex string. Every
//! failure mode is soft: callers get `None` and fall back to freeform
//! recognition.

use kurbo::Point;

/// Side length of the reference coordinate space the stroke paths live in.
pub const REFERENCE_SIZE: f64 = 109.0;

/// One canonical stroke of a reference glyph.
#[derive(Debug, Clone)]
pub struct ReferenceStroke {
    /// Element id from the source document (e.g. `kvg:04e00-s1`).
    pub id: String,
    /// SVG path data (`d` attribute).
    pub path: String,
    /// Stroke type annotation from the source, if present (e.g. `㇐`).
    pub kind: String,
}

/// The canonical stroke set for one character, in source order.
#[derive(Debug, Clone)]
pub struct ReferenceGlyph {
    pub glyph: char,
    pub strokes: Vec<ReferenceStroke>,
}

impl ReferenceGlyph {
    pub fn stroke_count(&self) -> usize {
        self.strokes.len()
    }
}

/// A source of reference glyphs.
///
/// `None` means "no guided validation available for this character", never a
/// hard error.
pub trait GlyphSource {
    fn fetch(&self, glyph: char) -> Option<ReferenceGlyph>;
}

/// Strategy for reading a stroke path's endpoints.
///
/// The validator only compares endpoints, so implementations may be as
/// coarse as they like; a full bezier evaluator can be swapped in without
/// touching the validator's accept/reject contract.
pub trait PathEndpoints {
    /// Returns `(start, end)` in the reference coordinate space, or `None`
    /// if the path has no parsable start coordinate.
    fn endpoints(&self, d: &str) -> Option<(Point, Point)>;
}

/// Approximate endpoint reader.
///
/// Start is the first move-to coordinate pair; end is the last coordinate
/// pair appearing anywhere in the path string. Curve control points are not
/// evaluated, only their final pair matters for the endpoint check.
#[derive(Debug, Default, Clone, Copy)]
pub struct ApproxEndpoints;

impl PathEndpoints for ApproxEndpoints {
    fn endpoints(&self, d: &str) -> Option<(Point, Point)> {
        let move_at = d.find(['M', 'm'])?;
        let head = scan_numbers(&d[move_at + 1..]);
        let (&sx, &sy) = (head.first()?, head.get(1)?);

        let all = scan_numbers(d);
        let ex = *all.get(all.len().checked_sub(2)?)?;
        let ey = *all.last()?;

        Some((Point::new(sx, sy), Point::new(ex, ey)))
    }
}

/// Extract every decimal number from an SVG path string, in order.
fn scan_numbers(s: &str) -> Vec<f64> {
    let mut numbers = Vec::new();
    let mut token = String::new();
    for c in s.chars() {
        if c.is_ascii_digit() || c == '.' {
            token.push(c);
        } else {
            if !token.is_empty() {
                if let Ok(n) = token.parse::<f64>() {
                    numbers.push(n);
                }
                token.clear();
            }
            // A minus sign both separates and signs the next number.
            if c == '-' {
                token.push(c);
            }
        }
    }
    if let Ok(n) = token.parse::<f64>() {
        numbers.push(n);
    }
    numbers
}

/// Parse the `<path>` elements out of a reference SVG document.
///
/// Only a flat attribute scan: the source documents are machine-generated
/// and regular enough that a full XML parse buys nothing here.
pub fn parse_reference_svg(glyph: char, body: &str) -> Option<ReferenceGlyph> {
    let mut strokes = Vec::new();
    let mut rest = body;
    while let Some(start) = rest.find("<path") {
        let tag = &rest[start..];
        let end = tag.find('>')?;
        let tag = &tag[..end];

        if let Some(d) = attr_value(tag, "d") {
            strokes.push(ReferenceStroke {
                id: attr_value(tag, "id").unwrap_or_default().to_string(),
                path: d.to_string(),
                kind: attr_value(tag, "kvg:type").unwrap_or_default().to_string(),
            });
        }
        rest = &rest[start + end..];
    }

    if strokes.is_empty() {
        return None;
    }
    Some(ReferenceGlyph { glyph, strokes })
}

/// Read a quoted attribute value from a single element tag.
fn attr_value<'a>(tag: &'a str, name: &str) -> Option<&'a str> {
    let needle = format!("{name}=\"");
    let mut search = tag;
    loop {
        let at = search.find(&needle)?;
        // Reject longer attribute names that merely end with `name`.
        let preceded_ok = at == 0
            || search[..at]
                .chars()
                .next_back()
                .is_some_and(|c| c.is_whitespace());
        let value_start = at + needle.len();
        if preceded_ok {
            let value_len = search[value_start..].find('"')?;
            return Some(&search[value_start..value_start + value_len]);
        }
        search = &search[value_start..];
    }
}

/// HTTP glyph source addressing `{base}/{codepoint:05x}.svg`.
#[cfg(not(target_arch = "wasm32"))]
pub struct HttpGlyphSource {
    base_url: String,
    client: reqwest::blocking::Client,
}

#[cfg(not(target_arch = "wasm32"))]
impl HttpGlyphSource {
    pub const DEFAULT_BASE_URL: &'static str =
        "https://raw.githubusercontent.com/KanjiVG/kanjivg/master/kanji";

    pub fn new() -> Self {
        Self::with_base_url(Self::DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::blocking::Client::new(),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl Default for HttpGlyphSource {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl GlyphSource for HttpGlyphSource {
    fn fetch(&self, glyph: char) -> Option<ReferenceGlyph> {
        let url = format!("{}/{:05x}.svg", self.base_url, glyph as u32);
        let response = match self.client.get(&url).send() {
            Ok(r) => r,
            Err(e) => {
                log::warn!("Glyph fetch failed for '{}': {}", glyph, e);
                return None;
            }
        };
        if !response.status().is_success() {
            log::warn!("Glyph fetch for '{}' returned {}", glyph, response.status());
            return None;
        }
        let body = response.text().ok()?;
        parse_reference_svg(glyph, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 109 109">
<g id="kvg:StrokePaths_04e8c">
<path id="kvg:04e8c-s1" kvg:type="㇐" d="M23.75,31.22c1.89,0.45,4.21,0.32,5.89,0.12c13.24-1.59,35.17-4.03,48.11-4.48c2.26-0.08,4.55-0.08,6.78,0.34"/>
<path id="kvg:04e8c-s2" kvg:type="㇐" d="M13.5,81.34c2.46,0.62,5.1,0.55,7.38,0.34c19.25-1.8,48.5-4.06,67.64-4.51c2.54-0.06,5.1-0.02,7.6,0.51"/>
</g>
</svg>"#;

    #[test]
    fn test_parse_reference_svg() {
        let glyph = parse_reference_svg('二', SAMPLE_SVG).unwrap();
        assert_eq!(glyph.stroke_count(), 2);
        assert_eq!(glyph.strokes[0].id, "kvg:04e8c-s1");
        assert_eq!(glyph.strokes[0].kind, "㇐");
        assert!(glyph.strokes[0].path.starts_with("M23.75,31.22"));
    }

    #[test]
    fn test_parse_empty_document() {
        assert!(parse_reference_svg('二', "<svg></svg>").is_none());
        assert!(parse_reference_svg('二', "not markup at all").is_none());
    }

    #[test]
    fn test_endpoints_simple_line() {
        let (start, end) = ApproxEndpoints.endpoints("M10,20 L30,40").unwrap();
        assert_eq!(start, Point::new(10.0, 20.0));
        assert_eq!(end, Point::new(30.0, 40.0));
    }

    #[test]
    fn test_endpoints_curve_path() {
        let d = "M23.75,31.22c1.89,0.45,4.21,0.32,5.89,0.12";
        let (start, end) = ApproxEndpoints.endpoints(d).unwrap();
        assert_eq!(start, Point::new(23.75, 31.22));
        // Last coordinate pair in the string, not an evaluated curve end.
        assert_eq!(end, Point::new(5.89, 0.12));
    }

    #[test]
    fn test_endpoints_negative_numbers() {
        let (start, end) = ApproxEndpoints.endpoints("M-5,-10 L-1,-2").unwrap();
        assert_eq!(start, Point::new(-5.0, -10.0));
        assert_eq!(end, Point::new(-1.0, -2.0));
    }

    #[test]
    fn test_endpoints_unparsable() {
        assert!(ApproxEndpoints.endpoints("").is_none());
        assert!(ApproxEndpoints.endpoints("garbage").is_none());
        assert!(ApproxEndpoints.endpoints("M").is_none());
    }

    #[test]
    fn test_attr_value_rejects_suffix_match() {
        let tag = r#"<path stroke-d="x" d="M1,2""#;
        assert_eq!(attr_value(tag, "d"), Some("M1,2"));
    }
}
