//! Conversion of a single SVG file into a library image record

use std::fs;
use std::path::Path;
use std::str::FromStr;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use svgtypes::{Length, LengthUnit, ViewBox};

use crate::config::Config;
use crate::error::{offset_at, ConvertError, Span};
use crate::title::derive_title;
use crate::walker::StyleContext;

/// Prefix of every image `data` field
pub const DATA_URI_PREFIX: &str = "data:image/svg+xml;base64,";

/// Aspect mode written for every image
pub const ASPECT_FIXED: &str = "fixed";

/// Resolution used to turn absolute units into user units
const DPI: f64 = 96.0;

/// Font size assumed for `em`/`ex` lengths
const FONT_SIZE: f64 = 16.0;

/// Viewport size used when a document gives neither a size nor a viewBox
pub const DEFAULT_VIEWPORT: f64 = 1000.0;

/// One icon entry of a draw.io library
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRecord {
    /// Base64 data URI of the SVG markup
    pub data: String,
    pub w: f64,
    pub h: f64,
    pub title: String,
    pub aspect: String,
}

/// Convert one SVG file into an [`ImageRecord`]
pub fn convert_svg(
    path: &Path,
    context: &StyleContext,
    config: &Config,
) -> Result<ImageRecord, ConvertError> {
    let bytes = fs::read(path).map_err(|e| ConvertError::io(path, e))?;
    let text = String::from_utf8(bytes).map_err(|e| ConvertError::Encoding {
        path: path.to_path_buf(),
        message: format!(
            "invalid UTF-8 after byte {}",
            e.utf8_error().valid_up_to()
        ),
        span: None,
    })?;

    let (w, h) = svg_size(&text, path)?;
    let data = encode_svg_data(&text, path)?;

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let title = derive_title(&stem, context, config);

    if title.is_empty() {
        log::warn!("'{}' produced an empty title", path.display());
    }
    if w <= 0.0 || h <= 0.0 {
        log::warn!("'{}' has a non-positive size {}x{}", path.display(), w, h);
    }
    log::debug!("converted '{}' as \"{}\" ({}x{})", path.display(), title, w, h);

    Ok(ImageRecord {
        data,
        w,
        h,
        title,
        aspect: ASPECT_FIXED.to_string(),
    })
}

/// Build the base64 data URI for raw SVG text
///
/// Everything before the first `<svg` is dropped, line endings are
/// normalized to `\n`, one trailing newline is stripped and the remaining
/// newlines become `&#xa;`. The markup must be ASCII.
pub fn encode_svg_data(text: &str, path: &Path) -> Result<String, ConvertError> {
    let start = text.find("<svg").ok_or_else(|| ConvertError::MissingSvgTag {
        path: path.to_path_buf(),
    })?;
    let body = &text[start..];

    // Offsets refer to the file on disk, so check before normalizing
    if let Some((idx, ch)) = body.char_indices().find(|(_, c)| !c.is_ascii()) {
        let offset = start + idx;
        return Err(ConvertError::Encoding {
            path: path.to_path_buf(),
            message: format!("non-ASCII character {:?} at byte {}", ch, offset),
            span: Some(offset..offset + ch.len_utf8()),
        });
    }

    let body = body.replace("\r\n", "\n").replace('\r', "\n");
    let body = body.strip_suffix('\n').unwrap_or(&body);
    let body = body.replace('\n', "&#xa;");
    Ok(format!("{}{}", DATA_URI_PREFIX, STANDARD.encode(body)))
}

/// Intrinsic width and height of an SVG document in user units
pub fn svg_size(text: &str, path: &Path) -> Result<(f64, f64), ConvertError> {
    let parse_error = |message: String, span: Option<Span>| ConvertError::Parse {
        path: path.to_path_buf(),
        message,
        span,
    };

    let options = roxmltree::ParsingOptions {
        allow_dtd: true,
        ..roxmltree::ParsingOptions::default()
    };
    let doc = roxmltree::Document::parse_with_options(text, options).map_err(|e| {
        let pos = e.pos();
        let offset = offset_at(text, pos.row, pos.col);
        parse_error(e.to_string(), Some(offset..(offset + 1).min(text.len())))
    })?;

    let root = doc.root_element();
    let tag_start = root.range().start;
    let tag_span = tag_start..(tag_start + 1 + root.tag_name().name().len()).min(text.len());

    if root.tag_name().name() != "svg" {
        return Err(parse_error(
            format!("root element is <{}>, expected <svg>", root.tag_name().name()),
            Some(tag_span),
        ));
    }

    let view_box = root
        .attribute("viewBox")
        .map(|value| {
            ViewBox::from_str(value)
                .map_err(|e| format!("invalid viewBox '{}': {}", value, e))
        })
        .transpose()
        .map_err(|message| parse_error(message, Some(tag_span.clone())))?
        .map(|vb| (vb.w, vb.h));

    let relative = |value: Option<&str>| value.map_or(true, |v| v.trim().ends_with('%'));
    if view_box.is_none() && (relative(root.attribute("width")) || relative(root.attribute("height"))) {
        log::warn!(
            "'{}' has no viewBox to size against, using a {}x{} viewport",
            path.display(),
            DEFAULT_VIEWPORT,
            DEFAULT_VIEWPORT
        );
    }

    let width = resolve_dimension(root.attribute("width"), view_box.map(|(w, _)| w), "width")
        .map_err(|message| parse_error(message, Some(tag_span.clone())))?;
    let height = resolve_dimension(root.attribute("height"), view_box.map(|(_, h)| h), "height")
        .map_err(|message| parse_error(message, Some(tag_span)))?;

    Ok((width, height))
}

/// Resolve a `width`/`height` attribute
///
/// A missing attribute means `100%`. Percentages are taken of the viewBox
/// size, or of [`DEFAULT_VIEWPORT`] without a viewBox.
fn resolve_dimension(
    value: Option<&str>,
    view_box: Option<f64>,
    name: &str,
) -> Result<f64, String> {
    let reference = view_box.unwrap_or(DEFAULT_VIEWPORT);
    let Some(value) = value else {
        return Ok(reference);
    };

    let length = Length::from_str(value.trim())
        .map_err(|e| format!("invalid {} '{}': {}", name, value, e))?;
    let n = length.number;

    match length.unit {
        LengthUnit::None | LengthUnit::Px => Ok(n),
        LengthUnit::Em => Ok(n * FONT_SIZE),
        LengthUnit::Ex => Ok(n * FONT_SIZE / 2.0),
        LengthUnit::In => Ok(n * DPI),
        LengthUnit::Cm => Ok(n * DPI / 2.54),
        LengthUnit::Mm => Ok(n * DPI / 25.4),
        LengthUnit::Pt => Ok(n * DPI / 72.0),
        LengthUnit::Pc => Ok(n * DPI / 6.0),
        LengthUnit::Percent => Ok(reference * n / 100.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn path() -> PathBuf {
        PathBuf::from("icons/circle/blue/c_camera_blue.svg")
    }

    fn decode(data: &str) -> String {
        let encoded = data.strip_prefix(DATA_URI_PREFIX).expect("prefix");
        String::from_utf8(STANDARD.decode(encoded).expect("base64")).expect("utf-8")
    }

    #[test]
    fn test_encode_strips_prolog() {
        let text = "<?xml version=\"1.0\"?>\n<!-- icon -->\n<svg width=\"10\"/>";
        let data = encode_svg_data(text, &path()).unwrap();
        assert_eq!(decode(&data), "<svg width=\"10\"/>");
    }

    #[test]
    fn test_encode_replaces_newlines() {
        let text = "<svg>\n  <rect/>\n</svg>\n";
        let data = encode_svg_data(text, &path()).unwrap();
        assert_eq!(decode(&data), "<svg>&#xa;  <rect/>&#xa;</svg>");
    }

    #[test]
    fn test_encode_strips_only_one_trailing_newline() {
        let data = encode_svg_data("<svg/>\n\n", &path()).unwrap();
        assert_eq!(decode(&data), "<svg/>&#xa;");
    }

    #[test]
    fn test_encode_normalizes_crlf() {
        let text = "<?xml version=\"1.0\"?>\r\n<svg>\r\n<rect/>\r\n</svg>\r\n";
        let decoded = decode(&encode_svg_data(text, &path()).unwrap());
        assert_eq!(decoded, "<svg>&#xa;<rect/>&#xa;</svg>");
        assert!(!decoded.contains('\r'));
    }

    #[test]
    fn test_encode_normalizes_lone_cr() {
        let data = encode_svg_data("<svg>\r<rect/>\r</svg>\r", &path()).unwrap();
        assert_eq!(decode(&data), "<svg>&#xa;<rect/>&#xa;</svg>");
    }

    #[test]
    fn test_encode_known_value() {
        let data = encode_svg_data("<svg/>", &path()).unwrap();
        assert_eq!(data, "data:image/svg+xml;base64,PHN2Zy8+");
    }

    #[test]
    fn test_encode_missing_svg_tag() {
        let result = encode_svg_data("<s:root/>", &path());
        assert!(matches!(result, Err(ConvertError::MissingSvgTag { .. })));
    }

    #[test]
    fn test_encode_non_ascii() {
        let text = "<svg><title>café</title></svg>";
        let err = encode_svg_data(text, &path()).unwrap_err();
        match err {
            ConvertError::Encoding { span, .. } => assert_eq!(span, Some(15..17)),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_non_ascii_before_svg_tag_is_dropped() {
        let text = "<!-- café -->\n<svg/>";
        let data = encode_svg_data(text, &path()).unwrap();
        assert_eq!(decode(&data), "<svg/>");
    }

    #[test]
    fn test_size_from_attributes() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="48" height="24"/>"#;
        assert_eq!(svg_size(svg, &path()).unwrap(), (48.0, 24.0));
    }

    #[test]
    fn test_size_from_viewbox() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 100 50"/>"#;
        assert_eq!(svg_size(svg, &path()).unwrap(), (100.0, 50.0));
    }

    #[test]
    fn test_size_attributes_win_over_viewbox() {
        let svg = r#"<svg width="20px" height="10" viewBox="0 0 100 50"/>"#;
        assert_eq!(svg_size(svg, &path()).unwrap(), (20.0, 10.0));
    }

    #[test]
    fn test_size_with_units() {
        let svg = r#"<svg width="1in" height="72pt"/>"#;
        assert_eq!(svg_size(svg, &path()).unwrap(), (96.0, 96.0));
    }

    #[test]
    fn test_size_percentage_of_viewbox() {
        let svg = r#"<svg width="50%" height="100%" viewBox="0 0 80 40"/>"#;
        assert_eq!(svg_size(svg, &path()).unwrap(), (40.0, 40.0));
    }

    #[test]
    fn test_size_with_doctype() {
        let svg = "<?xml version=\"1.0\"?>\n<!DOCTYPE svg PUBLIC \"-//W3C//DTD SVG 1.1//EN\" \"http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd\">\n<svg width=\"16\" height=\"16\"/>";
        assert_eq!(svg_size(svg, &path()).unwrap(), (16.0, 16.0));
    }

    #[test]
    fn test_size_missing_uses_default_viewport() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg"><rect/></svg>"#;
        assert_eq!(
            svg_size(svg, &path()).unwrap(),
            (DEFAULT_VIEWPORT, DEFAULT_VIEWPORT)
        );
    }

    #[test]
    fn test_size_percentage_without_viewbox() {
        let svg = r#"<svg width="50%" height="24"/>"#;
        assert_eq!(svg_size(svg, &path()).unwrap(), (DEFAULT_VIEWPORT / 2.0, 24.0));
    }

    #[test]
    fn test_size_malformed_xml() {
        let err = svg_size("<svg width=\"1\" height=\"1\">\n<rect>\n</svg>", &path()).unwrap_err();
        match err {
            ConvertError::Parse { span, .. } => assert!(span.is_some()),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_size_wrong_root() {
        let err = svg_size("<html width=\"1\" height=\"1\"/>", &path()).unwrap_err();
        assert!(err.to_string().contains("expected <svg>"));
    }

    #[test]
    fn test_size_invalid_length() {
        let err = svg_size(r#"<svg width="wide" height="1"/>"#, &path()).unwrap_err();
        assert!(err.to_string().contains("invalid width"));
    }
}
