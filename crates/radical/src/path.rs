//! Radical outlines as SVG path data, the `<svg>` markup wrapping them, and
//! resolution of that markup into a drawable glyph.

use crate::delimiter::PathTemplate;
use crate::error::{RadicalError, RadicalResult};
use crate::layout::{Rect, Size};
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// Design units per em
pub const UNITS_PER_EM: f32 = 1000.0;

/// Padding above the vinculum, in design units
pub const HLINE_PAD: f32 = 80.0;

/// Vinculum thickness before any extra thickness, in design units
pub const VINCULUM: f32 = 40.0;

/// The vinculum runs out to here and is clipped by the view box width
const VINCULUM_END: f32 = 400_000.0;

const SVG_NS: &str = "http://www.w3.org/2000/svg";

// =============================================================================
// Path Commands
// =============================================================================

/// Path drawing commands (absolute coordinates)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PathCommand {
    MoveTo(f32, f32),
    LineTo(f32, f32),
    QuadTo(f32, f32, f32, f32),            // control point, end point
    CubicTo(f32, f32, f32, f32, f32, f32), // two control points, end point
    Close,
}

/// A resolved radical glyph ready to be drawn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderableGlyph {
    /// On-canvas size
    pub viewport: Size,
    /// Region of the design grid mapped onto the viewport
    pub view_box: Rect,
    /// Outline in design units
    pub commands: Vec<PathCommand>,
}

// =============================================================================
// Path Synthesis
// =============================================================================

/// Horizontal extent of each outline, in design units. The vinculum starts here.
fn template_advance(template: PathTemplate) -> f32 {
    match template {
        PathTemplate::Main => 833.0,
        PathTemplate::Size1
        | PathTemplate::Size2
        | PathTemplate::Size3
        | PathTemplate::Size4 => 1000.0,
        PathTemplate::Tall => 1056.0,
    }
}

/// Ink height below the vinculum top, in design units
fn template_ink_height(template: PathTemplate, view_box_height: f32, extra: f32) -> f32 {
    match template {
        PathTemplate::Main => 1000.0,
        PathTemplate::Size1 => 1200.0,
        PathTemplate::Size2 => 1800.0,
        PathTemplate::Size3 => 2400.0,
        PathTemplate::Size4 => 3000.0,
        PathTemplate::Tall => view_box_height - HLINE_PAD - extra,
    }
}

/// SVG path data for a radical outline.
///
/// `extra_thickness` (em) thickens the vinculum; `view_box_height` (design
/// units) only shapes the tall outline, the fixed ones have a set height.
pub fn synthesize_path(template: PathTemplate, extra_thickness: f32, view_box_height: f32) -> String {
    let extra = extra_thickness * UNITS_PER_EM;
    let advance = template_advance(template);
    let ink = template_ink_height(template, view_box_height, extra).max(VINCULUM + extra);

    let top = HLINE_PAD;
    let rule = VINCULUM + extra;
    let bottom = top + extra + ink;

    // The hook sits at a fixed size; only the long stroke stretches.
    let hook_y = bottom - 380.0_f32.min(ink * 0.38);
    let foot = bottom - 20.0;

    let points = [
        (advance * 0.11, hook_y + 30.0),
        (advance * 0.20, hook_y - 20.0),
        (advance * 0.45, foot - 200.0_f32.min(ink * 0.2)),
        (advance - rule * 0.5, top),
        (VINCULUM_END, top),
        (VINCULUM_END, top + rule),
        (advance + rule * 0.3, top + rule),
        (advance * 0.49, bottom),
        (advance * 0.43, bottom),
        (advance * 0.17, hook_y + 10.0),
        (advance * 0.13, hook_y + 40.0),
    ];

    let mut data = String::with_capacity(points.len() * 16);
    for (i, (x, y)) in points.iter().enumerate() {
        let cmd = if i == 0 { 'M' } else { 'L' };
        // Writing into a String never fails
        let _ = write!(data, "{}{} {}", cmd, round_coord(*x), round_coord(*y));
    }
    data.push('Z');
    data
}

/// Coordinates are kept to two decimals
fn round_coord(v: f32) -> f32 {
    (v * 100.0).round() / 100.0
}

// =============================================================================
// Markup
// =============================================================================

/// Wrap path data in an `<svg>` element sized to `viewport` and mapping
/// `view_box` onto it.
pub fn build_svg_markup(path_data: &str, viewport: Size, view_box: Rect) -> RadicalResult<String> {
    let mut buffer = Vec::new();
    {
        let mut writer = Writer::new(&mut buffer);

        let width = viewport.width.to_string();
        let height = viewport.height.to_string();
        let view_box_attr = format!(
            "{} {} {} {}",
            view_box.x(),
            view_box.y(),
            view_box.width(),
            view_box.height()
        );

        let mut svg = BytesStart::new("svg");
        svg.push_attribute(("xmlns", SVG_NS));
        svg.push_attribute(("width", width.as_str()));
        svg.push_attribute(("height", height.as_str()));
        svg.push_attribute(("viewBox", view_box_attr.as_str()));
        svg.push_attribute(("preserveAspectRatio", "none"));
        writer
            .write_event(Event::Start(svg))
            .map_err(|e| RadicalError::Markup(e.to_string()))?;

        let mut path = BytesStart::new("path");
        path.push_attribute(("d", path_data));
        writer
            .write_event(Event::Empty(path))
            .map_err(|e| RadicalError::Markup(e.to_string()))?;

        writer
            .write_event(Event::End(BytesEnd::new("svg")))
            .map_err(|e| RadicalError::Markup(e.to_string()))?;
    }
    String::from_utf8(buffer).map_err(|e| RadicalError::Markup(e.to_string()))
}

/// Parse glyph markup into a drawable glyph
pub fn resolve_renderable(markup: &str) -> RadicalResult<RenderableGlyph> {
    let mut reader = Reader::from_str(markup);
    reader.config_mut().trim_text(true);

    let mut viewport = None;
    let mut view_box = None;
    let mut commands = None;
    let mut buf = Vec::new();

    loop {
        buf.clear();
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => match e.name().as_ref() {
                b"svg" => {
                    let width = parse_number(&required_attr(e, "width")?)?;
                    let height = parse_number(&required_attr(e, "height")?)?;
                    viewport = Some(Size::new(width, height));
                    view_box = Some(parse_view_box(&required_attr(e, "viewBox")?)?);
                }
                b"path" => {
                    commands = Some(parse_path_data(&required_attr(e, "d")?)?);
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(RadicalError::Xml(e)),
            _ => {}
        }
    }

    match (viewport, view_box, commands) {
        (Some(viewport), Some(view_box), Some(commands)) => Ok(RenderableGlyph {
            viewport,
            view_box,
            commands,
        }),
        _ => Err(RadicalError::Markup(
            "expected an <svg> element with a <path>".to_string(),
        )),
    }
}

fn required_attr(e: &BytesStart<'_>, name: &str) -> RadicalResult<String> {
    for attr in e.attributes().flatten() {
        if attr.key.as_ref() == name.as_bytes() {
            return Ok(String::from_utf8_lossy(&attr.value).to_string());
        }
    }
    Err(RadicalError::Markup(format!("missing attribute {}", name)))
}

fn parse_number(text: &str) -> RadicalResult<f32> {
    text.trim()
        .parse::<f32>()
        .map_err(|_| RadicalError::Markup(format!("invalid number {:?}", text)))
}

fn parse_view_box(text: &str) -> RadicalResult<Rect> {
    let values = text
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(parse_number)
        .collect::<RadicalResult<Vec<_>>>()?;

    match values.as_slice() {
        [x, y, w, h] => Ok(Rect::new(*x, *y, *w, *h)),
        _ => Err(RadicalError::Markup(format!("invalid viewBox {:?}", text))),
    }
}

// =============================================================================
// Path Data Parsing
// =============================================================================

/// Split path data into command letters and numbers
fn tokenize(data: &str) -> RadicalResult<Vec<PathToken>> {
    let mut tokens = Vec::new();
    let mut chars = data.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        if c.is_whitespace() || c == ',' {
            chars.next();
        } else if c.is_ascii_alphabetic() {
            tokens.push(PathToken::Command(c));
            chars.next();
        } else if c == '-' || c == '+' || c == '.' || c.is_ascii_digit() {
            let mut end = start + c.len_utf8();
            let mut seen_dot = c == '.';
            chars.next();
            while let Some(&(i, n)) = chars.peek() {
                let continues = n.is_ascii_digit()
                    || (n == '.' && !seen_dot)
                    || ((n == 'e' || n == 'E') && !data[start..i].contains(['e', 'E']));
                if !continues {
                    break;
                }
                seen_dot |= n == '.';
                end = i + n.len_utf8();
                chars.next();
                if n == 'e' || n == 'E' {
                    if let Some(&(j, sign)) = chars.peek() {
                        if sign == '-' || sign == '+' {
                            end = j + 1;
                            chars.next();
                        }
                    }
                }
            }
            tokens.push(PathToken::Number(parse_number(&data[start..end])?));
        } else {
            return Err(RadicalError::Markup(format!(
                "unexpected character {:?} in path data",
                c
            )));
        }
    }

    Ok(tokens)
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum PathToken {
    Command(char),
    Number(f32),
}

/// Parse SVG path data (M, L, H, V, Q, C, Z and their relative forms) into
/// absolute commands
pub fn parse_path_data(data: &str) -> RadicalResult<Vec<PathCommand>> {
    let tokens = tokenize(data)?;
    let mut commands = Vec::new();
    let mut pos = 0;
    let mut current = (0.0f32, 0.0f32);
    let mut subpath_start = (0.0f32, 0.0f32);
    let mut command: Option<char> = None;

    let take = |pos: &mut usize, count: usize| -> RadicalResult<Vec<f32>> {
        let mut values = Vec::with_capacity(count);
        for _ in 0..count {
            match tokens.get(*pos) {
                Some(PathToken::Number(n)) => values.push(*n),
                _ => {
                    return Err(RadicalError::Markup(
                        "path command is missing coordinates".to_string(),
                    ))
                }
            }
            *pos += 1;
        }
        Ok(values)
    };

    while pos < tokens.len() {
        let cmd = match tokens[pos] {
            PathToken::Command(c) => {
                pos += 1;
                c
            }
            // Repeated coordinates reuse the previous command; a repeated
            // move becomes a line.
            PathToken::Number(_) => match command {
                Some('M') => 'L',
                Some('m') => 'l',
                Some(c) if !matches!(c, 'Z' | 'z') => c,
                _ => {
                    return Err(RadicalError::Markup(
                        "path data must start with a command".to_string(),
                    ))
                }
            },
        };
        command = Some(cmd);

        let relative = cmd.is_ascii_lowercase();
        let (ox, oy) = if relative { current } else { (0.0, 0.0) };

        match cmd.to_ascii_uppercase() {
            'M' => {
                let v = take(&mut pos, 2)?;
                current = (ox + v[0], oy + v[1]);
                subpath_start = current;
                commands.push(PathCommand::MoveTo(current.0, current.1));
            }
            'L' => {
                let v = take(&mut pos, 2)?;
                current = (ox + v[0], oy + v[1]);
                commands.push(PathCommand::LineTo(current.0, current.1));
            }
            'H' => {
                let v = take(&mut pos, 1)?;
                current.0 = ox + v[0];
                commands.push(PathCommand::LineTo(current.0, current.1));
            }
            'V' => {
                let v = take(&mut pos, 1)?;
                current.1 = oy + v[0];
                commands.push(PathCommand::LineTo(current.0, current.1));
            }
            'Q' => {
                let v = take(&mut pos, 4)?;
                let end = (ox + v[2], oy + v[3]);
                commands.push(PathCommand::QuadTo(ox + v[0], oy + v[1], end.0, end.1));
                current = end;
            }
            'C' => {
                let v = take(&mut pos, 6)?;
                let end = (ox + v[4], oy + v[5]);
                commands.push(PathCommand::CubicTo(
                    ox + v[0],
                    oy + v[1],
                    ox + v[2],
                    oy + v[3],
                    end.0,
                    end.1,
                ));
                current = end;
            }
            'Z' => {
                commands.push(PathCommand::Close);
                current = subpath_start;
            }
            _ => {
                return Err(RadicalError::Markup(format!(
                    "unsupported path command {:?}",
                    cmd
                )))
            }
        }
    }

    Ok(commands)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthesized_path_parses() {
        for template in [
            PathTemplate::Main,
            PathTemplate::Size1,
            PathTemplate::Size4,
            PathTemplate::Tall,
        ] {
            let data = synthesize_path(template, 0.0, 5080.0);
            let commands = parse_path_data(&data).unwrap();
            assert!(matches!(commands[0], PathCommand::MoveTo(..)));
            assert_eq!(commands.last(), Some(&PathCommand::Close));
        }
    }

    #[test]
    fn test_tall_path_reaches_view_box_bottom() {
        let data = synthesize_path(PathTemplate::Tall, 0.0, 5080.0);
        let commands = parse_path_data(&data).unwrap();
        let lowest = commands
            .iter()
            .filter_map(|c| match c {
                PathCommand::MoveTo(_, y) | PathCommand::LineTo(_, y) => Some(*y),
                _ => None,
            })
            .fold(f32::MIN, f32::max);
        assert_eq!(lowest, 5080.0);
    }

    #[test]
    fn test_extra_thickness_thickens_vinculum() {
        let thin = parse_path_data(&synthesize_path(PathTemplate::Main, 0.0, 1080.0)).unwrap();
        let thick = parse_path_data(&synthesize_path(PathTemplate::Main, 0.02, 1100.0)).unwrap();
        // Points 4 and 5 are the far end of the vinculum
        let span = |cmds: &[PathCommand]| match (cmds[4], cmds[5]) {
            (PathCommand::LineTo(_, a), PathCommand::LineTo(_, b)) => b - a,
            _ => panic!("unexpected outline"),
        };
        assert_eq!(span(&thin), 40.0);
        assert_eq!(span(&thick), 60.0);
    }

    #[test]
    fn test_coordinates_keep_two_decimals() {
        let data = synthesize_path(PathTemplate::Tall, 0.0123, 1234.567);
        for token in data.split(|c: char| c.is_ascii_alphabetic() || c == ' ') {
            if let Some((_, decimals)) = token.split_once('.') {
                assert!(decimals.len() <= 2, "{} in {}", token, data);
            }
        }
        assert!(data.starts_with('M'));
        assert!(data.ends_with('Z'));
    }

    #[test]
    fn test_markup_resolves() {
        let data = synthesize_path(PathTemplate::Size2, 0.0, 1880.0);
        let markup = build_svg_markup(
            &data,
            Size::new(30.0, 18.8),
            Rect::new(0.0, 0.0, 3000.0, 1880.0),
        )
        .unwrap();
        assert!(markup.starts_with("<svg"));

        let glyph = resolve_renderable(&markup).unwrap();
        assert_eq!(glyph.viewport, Size::new(30.0, 18.8));
        assert_eq!(glyph.view_box, Rect::new(0.0, 0.0, 3000.0, 1880.0));
        assert_eq!(glyph.commands, parse_path_data(&data).unwrap());
    }

    #[test]
    fn test_relative_and_shorthand_commands() {
        let commands = parse_path_data("m10 20 5 5h10v-5l-1.5e1,0z").unwrap();
        assert_eq!(
            commands,
            vec![
                PathCommand::MoveTo(10.0, 20.0),
                PathCommand::LineTo(15.0, 25.0),
                PathCommand::LineTo(25.0, 25.0),
                PathCommand::LineTo(25.0, 20.0),
                PathCommand::LineTo(10.0, 20.0),
                PathCommand::Close,
            ]
        );
    }

    #[test]
    fn test_curves() {
        let commands = parse_path_data("M0 0Q5 5 10 0c1 1 2 2 3 3").unwrap();
        assert_eq!(commands[1], PathCommand::QuadTo(5.0, 5.0, 10.0, 0.0));
        assert_eq!(
            commands[2],
            PathCommand::CubicTo(11.0, 1.0, 12.0, 2.0, 13.0, 3.0)
        );
    }

    #[test]
    fn test_malformed_path_data() {
        assert!(parse_path_data("M10").is_err());
        assert!(parse_path_data("10 10").is_err());
        assert!(parse_path_data("M0 0 A 1 1 0 0 1 5 5").is_err());
        assert!(parse_path_data("M0 0 L#").is_err());
    }

    #[test]
    fn test_malformed_markup() {
        assert!(matches!(
            resolve_renderable("<svg width=\"1\" height=\"1\"></svg>"),
            Err(RadicalError::Markup(_))
        ));
        assert!(resolve_renderable("<svg width=\"x\" height=\"1\" viewBox=\"0 0 1 1\"><path d=\"M0 0\"/></svg>").is_err());
        assert!(resolve_renderable("<svg><path d=\"M0 0\"></svg>").is_err());
    }
}
