//! Shared boundary types for the transform toy.
//!
//! This module defines the data contracts between the layers:
//! - Source → Engine: `Color` and `Axis` carried by authored commands
//! - Engine → Player: `Trace` containing styled `TraceLine`s
//! - Renderer → Player: `Cell` grids sized by a `TerminalContract`

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Shared style primitives
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Color {
    Named(NamedColor),
    /// Any other CSS color keyword.
    Keyword(CssKeyword),
    Rgba { r: u8, g: u8, b: u8, a: u8 },
    Rgb { r: u8, g: u8, b: u8 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamedColor {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    Gray,
    Orange,
    Purple,
}

impl NamedColor {
    const ALL: [(NamedColor, &'static str); 11] = [
        (NamedColor::Black, "black"),
        (NamedColor::Red, "red"),
        (NamedColor::Green, "green"),
        (NamedColor::Yellow, "yellow"),
        (NamedColor::Blue, "blue"),
        (NamedColor::Magenta, "magenta"),
        (NamedColor::Cyan, "cyan"),
        (NamedColor::White, "white"),
        (NamedColor::Gray, "gray"),
        (NamedColor::Orange, "orange"),
        (NamedColor::Purple, "purple"),
    ];

    pub fn css_name(self) -> &'static str {
        Self::ALL
            .iter()
            .find(|(c, _)| *c == self)
            .map(|(_, name)| *name)
            .unwrap_or("black")
    }
}

/// CSS keywords outside the terminal palette, with their sRGB values.
const CSS_KEYWORDS: [(&str, [u8; 3]); 136] = [
    ("aliceblue", [0xf0, 0xf8, 0xff]),
    ("antiquewhite", [0xfa, 0xeb, 0xd7]),
    ("aqua", [0x00, 0xff, 0xff]),
    ("aquamarine", [0x7f, 0xff, 0xd4]),
    ("azure", [0xf0, 0xff, 0xff]),
    ("beige", [0xf5, 0xf5, 0xdc]),
    ("bisque", [0xff, 0xe4, 0xc4]),
    ("blanchedalmond", [0xff, 0xeb, 0xcd]),
    ("blueviolet", [0x8a, 0x2b, 0xe2]),
    ("brown", [0xa5, 0x2a, 0x2a]),
    ("burlywood", [0xde, 0xb8, 0x87]),
    ("cadetblue", [0x5f, 0x9e, 0xa0]),
    ("chartreuse", [0x7f, 0xff, 0x00]),
    ("chocolate", [0xd2, 0x69, 0x1e]),
    ("coral", [0xff, 0x7f, 0x50]),
    ("cornflowerblue", [0x64, 0x95, 0xed]),
    ("cornsilk", [0xff, 0xf8, 0xdc]),
    ("crimson", [0xdc, 0x14, 0x3c]),
    ("darkblue", [0x00, 0x00, 0x8b]),
    ("darkcyan", [0x00, 0x8b, 0x8b]),
    ("darkgoldenrod", [0xb8, 0x86, 0x0b]),
    ("darkgray", [0xa9, 0xa9, 0xa9]),
    ("darkgreen", [0x00, 0x64, 0x00]),
    ("darkgrey", [0xa9, 0xa9, 0xa9]),
    ("darkkhaki", [0xbd, 0xb7, 0x6b]),
    ("darkmagenta", [0x8b, 0x00, 0x8b]),
    ("darkolivegreen", [0x55, 0x6b, 0x2f]),
    ("darkorange", [0xff, 0x8c, 0x00]),
    ("darkorchid", [0x99, 0x32, 0xcc]),
    ("darkred", [0x8b, 0x00, 0x00]),
    ("darksalmon", [0xe9, 0x96, 0x7a]),
    ("darkseagreen", [0x8f, 0xbc, 0x8f]),
    ("darkslateblue", [0x48, 0x3d, 0x8b]),
    ("darkslategray", [0x2f, 0x4f, 0x4f]),
    ("darkslategrey", [0x2f, 0x4f, 0x4f]),
    ("darkturquoise", [0x00, 0xce, 0xd1]),
    ("darkviolet", [0x94, 0x00, 0xd3]),
    ("deeppink", [0xff, 0x14, 0x93]),
    ("deepskyblue", [0x00, 0xbf, 0xff]),
    ("dimgray", [0x69, 0x69, 0x69]),
    ("dimgrey", [0x69, 0x69, 0x69]),
    ("dodgerblue", [0x1e, 0x90, 0xff]),
    ("firebrick", [0xb2, 0x22, 0x22]),
    ("floralwhite", [0xff, 0xfa, 0xf0]),
    ("forestgreen", [0x22, 0x8b, 0x22]),
    ("fuchsia", [0xff, 0x00, 0xff]),
    ("gainsboro", [0xdc, 0xdc, 0xdc]),
    ("ghostwhite", [0xf8, 0xf8, 0xff]),
    ("gold", [0xff, 0xd7, 0x00]),
    ("goldenrod", [0xda, 0xa5, 0x20]),
    ("greenyellow", [0xad, 0xff, 0x2f]),
    ("honeydew", [0xf0, 0xff, 0xf0]),
    ("hotpink", [0xff, 0x69, 0xb4]),
    ("indianred", [0xcd, 0x5c, 0x5c]),
    ("indigo", [0x4b, 0x00, 0x82]),
    ("ivory", [0xff, 0xff, 0xf0]),
    ("khaki", [0xf0, 0xe6, 0x8c]),
    ("lavender", [0xe6, 0xe6, 0xfa]),
    ("lavenderblush", [0xff, 0xf0, 0xf5]),
    ("lawngreen", [0x7c, 0xfc, 0x00]),
    ("lemonchiffon", [0xff, 0xfa, 0xcd]),
    ("lightblue", [0xad, 0xd8, 0xe6]),
    ("lightcoral", [0xf0, 0x80, 0x80]),
    ("lightcyan", [0xe0, 0xff, 0xff]),
    ("lightgoldenrodyellow", [0xfa, 0xfa, 0xd2]),
    ("lightgray", [0xd3, 0xd3, 0xd3]),
    ("lightgreen", [0x90, 0xee, 0x90]),
    ("lightgrey", [0xd3, 0xd3, 0xd3]),
    ("lightpink", [0xff, 0xb6, 0xc1]),
    ("lightsalmon", [0xff, 0xa0, 0x7a]),
    ("lightseagreen", [0x20, 0xb2, 0xaa]),
    ("lightskyblue", [0x87, 0xce, 0xfa]),
    ("lightslategray", [0x77, 0x88, 0x99]),
    ("lightslategrey", [0x77, 0x88, 0x99]),
    ("lightsteelblue", [0xb0, 0xc4, 0xde]),
    ("lightyellow", [0xff, 0xff, 0xe0]),
    ("lime", [0x00, 0xff, 0x00]),
    ("limegreen", [0x32, 0xcd, 0x32]),
    ("linen", [0xfa, 0xf0, 0xe6]),
    ("maroon", [0x80, 0x00, 0x00]),
    ("mediumaquamarine", [0x66, 0xcd, 0xaa]),
    ("mediumblue", [0x00, 0x00, 0xcd]),
    ("mediumorchid", [0xba, 0x55, 0xd3]),
    ("mediumpurple", [0x93, 0x70, 0xdb]),
    ("mediumseagreen", [0x3c, 0xb3, 0x71]),
    ("mediumslateblue", [0x7b, 0x68, 0xee]),
    ("mediumspringgreen", [0x00, 0xfa, 0x9a]),
    ("mediumturquoise", [0x48, 0xd1, 0xcc]),
    ("mediumvioletred", [0xc7, 0x15, 0x85]),
    ("midnightblue", [0x19, 0x19, 0x70]),
    ("mintcream", [0xf5, 0xff, 0xfa]),
    ("mistyrose", [0xff, 0xe4, 0xe1]),
    ("moccasin", [0xff, 0xe4, 0xb5]),
    ("navajowhite", [0xff, 0xde, 0xad]),
    ("navy", [0x00, 0x00, 0x80]),
    ("oldlace", [0xfd, 0xf5, 0xe6]),
    ("olive", [0x80, 0x80, 0x00]),
    ("olivedrab", [0x6b, 0x8e, 0x23]),
    ("orangered", [0xff, 0x45, 0x00]),
    ("orchid", [0xda, 0x70, 0xd6]),
    ("palegoldenrod", [0xee, 0xe8, 0xaa]),
    ("palegreen", [0x98, 0xfb, 0x98]),
    ("paleturquoise", [0xaf, 0xee, 0xee]),
    ("palevioletred", [0xdb, 0x70, 0x93]),
    ("papayawhip", [0xff, 0xef, 0xd5]),
    ("peachpuff", [0xff, 0xda, 0xb9]),
    ("peru", [0xcd, 0x85, 0x3f]),
    ("pink", [0xff, 0xc0, 0xcb]),
    ("plum", [0xdd, 0xa0, 0xdd]),
    ("powderblue", [0xb0, 0xe0, 0xe6]),
    ("rebeccapurple", [0x66, 0x33, 0x99]),
    ("rosybrown", [0xbc, 0x8f, 0x8f]),
    ("royalblue", [0x41, 0x69, 0xe1]),
    ("saddlebrown", [0x8b, 0x45, 0x13]),
    ("salmon", [0xfa, 0x80, 0x72]),
    ("sandybrown", [0xf4, 0xa4, 0x60]),
    ("seagreen", [0x2e, 0x8b, 0x57]),
    ("seashell", [0xff, 0xf5, 0xee]),
    ("sienna", [0xa0, 0x52, 0x2d]),
    ("silver", [0xc0, 0xc0, 0xc0]),
    ("skyblue", [0x87, 0xce, 0xeb]),
    ("slateblue", [0x6a, 0x5a, 0xcd]),
    ("slategray", [0x70, 0x80, 0x90]),
    ("slategrey", [0x70, 0x80, 0x90]),
    ("snow", [0xff, 0xfa, 0xfa]),
    ("springgreen", [0x00, 0xff, 0x7f]),
    ("steelblue", [0x46, 0x82, 0xb4]),
    ("tan", [0xd2, 0xb4, 0x8c]),
    ("teal", [0x00, 0x80, 0x80]),
    ("thistle", [0xd8, 0xbf, 0xd8]),
    ("tomato", [0xff, 0x63, 0x47]),
    ("turquoise", [0x40, 0xe0, 0xd0]),
    ("violet", [0xee, 0x82, 0xee]),
    ("wheat", [0xf5, 0xde, 0xb3]),
    ("whitesmoke", [0xf5, 0xf5, 0xf5]),
    ("yellowgreen", [0x9a, 0xcd, 0x32]),
];

/// Index into the CSS keyword table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CssKeyword(u8);

impl CssKeyword {
    pub fn lookup(name: &str) -> Option<Self> {
        CSS_KEYWORDS
            .iter()
            .position(|(keyword, _)| *keyword == name)
            .map(|i| CssKeyword(i as u8))
    }

    pub fn name(self) -> &'static str {
        CSS_KEYWORDS.get(self.0 as usize).map_or("black", |(name, _)| *name)
    }

    pub fn rgb(self) -> [u8; 3] {
        CSS_KEYWORDS.get(self.0 as usize).map_or([0, 0, 0], |(_, rgb)| *rgb)
    }
}

impl Default for Color {
    /// Primitives without an explicit color are drawn blue.
    fn default() -> Self {
        Color::Named(NamedColor::Blue)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized color {0:?}")]
pub struct ParseColorError(pub String);

impl FromStr for Color {
    type Err = ParseColorError;

    /// Accepts the CSS forms the toys are authored with: a color keyword,
    /// `#rgb`, `#rgba`, `#rrggbb` or `#rrggbbaa`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || ParseColorError(s.to_string());
        if let Some(hex) = s.strip_prefix('#') {
            let digits: Vec<u8> = hex
                .chars()
                .map(|c| c.to_digit(16).map(|d| d as u8))
                .collect::<Option<_>>()
                .ok_or_else(invalid)?;
            return match digits.as_slice() {
                [r, g, b] => Ok(Color::Rgb { r: r * 17, g: g * 17, b: b * 17 }),
                [r, g, b, a] => Ok(Color::Rgba { r: r * 17, g: g * 17, b: b * 17, a: a * 17 }),
                [r1, r0, g1, g0, b1, b0] => Ok(Color::Rgb {
                    r: r1 * 16 + r0,
                    g: g1 * 16 + g0,
                    b: b1 * 16 + b0,
                }),
                [r1, r0, g1, g0, b1, b0, a1, a0] => Ok(Color::Rgba {
                    r: r1 * 16 + r0,
                    g: g1 * 16 + g0,
                    b: b1 * 16 + b0,
                    a: a1 * 16 + a0,
                }),
                _ => Err(invalid()),
            };
        }

        let lower = s.to_ascii_lowercase();
        let lower = if lower == "grey" { "gray".to_string() } else { lower };
        NamedColor::ALL
            .iter()
            .find(|(_, name)| *name == lower)
            .map(|(c, _)| Color::Named(*c))
            .or_else(|| CssKeyword::lookup(&lower).map(Color::Keyword))
            .ok_or_else(invalid)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Named(n) => f.write_str(n.css_name()),
            Color::Keyword(k) => f.write_str(k.name()),
            Color::Rgba { r, g, b, a } => write!(f, "#{r:02x}{g:02x}{b:02x}{a:02x}"),
            Color::Rgb { r, g, b } => write!(f, "#{r:02x}{g:02x}{b:02x}"),
        }
    }
}

fn is_false(b: &bool) -> bool {
    !*b
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Style {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fg: Option<Color>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub bold: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub dim: bool,
}

impl Style {
    pub fn fg(color: Color) -> Self {
        Style {
            fg: Some(color),
            ..Default::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn unit(self) -> nalgebra::Vector3<f64> {
        match self {
            Axis::X => nalgebra::Vector3::x(),
            Axis::Y => nalgebra::Vector3::y(),
            Axis::Z => nalgebra::Vector3::z(),
        }
    }

    pub fn letter(self) -> char {
        match self {
            Axis::X => 'X',
            Axis::Y => 'Y',
            Axis::Z => 'Z',
        }
    }
}

// ---------------------------------------------------------------------------
// Engine → Player boundary
// ---------------------------------------------------------------------------

/// How far a trace line's command has been applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    Inactive,
    Partial,
    Complete,
}

impl Activation {
    pub fn from_amount(amt: f64) -> Self {
        if amt <= 0.0 {
            Activation::Inactive
        } else if amt < 1.0 {
            Activation::Partial
        } else {
            Activation::Complete
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            Activation::Inactive => "c-zero",
            Activation::Partial => "c-act",
            Activation::Complete => "c-one",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceLine {
    pub activation: Activation,
    pub text: String,
}

/// Pseudocode readout of one replay pass, plus anything the pass had to
/// report about the command list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    pub lines: Vec<TraceLine>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<String>,
}

impl Trace {
    pub fn push(&mut self, amt: f64, text: String) {
        self.lines.push(TraceLine {
            activation: Activation::from_amount(amt),
            text,
        });
    }

    /// Render as span markup, one `<span class="..">line</span><br/>` per line.
    pub fn to_html(&self) -> String {
        self.lines
            .iter()
            .map(|line| {
                format!(
                    "<span class=\"{}\">{}</span><br/>",
                    line.activation.css_class(),
                    escape_html(&line.text)
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Renderer → Player boundary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminalContract {
    pub width: u16,
    pub height: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub ch: char,
    #[serde(default)]
    pub style: Style,
}

impl Default for Cell {
    fn default() -> Self {
        Cell {
            ch: ' ',
            style: Style::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellChange {
    pub x: u16,
    pub y: u16,
    pub cell: Cell,
}

pub type Grid = Vec<Vec<Cell>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_css_colors() {
        assert_eq!("red".parse::<Color>().unwrap(), Color::Named(NamedColor::Red));
        assert_eq!("Grey".parse::<Color>().unwrap(), Color::Named(NamedColor::Gray));
        assert_eq!(
            "#ff8000".parse::<Color>().unwrap(),
            Color::Rgb { r: 255, g: 128, b: 0 }
        );
        assert_eq!("#0f0".parse::<Color>().unwrap(), Color::Rgb { r: 0, g: 255, b: 0 });
        assert!("chartreuse-ish".parse::<Color>().is_err());
        assert!("#1234567".parse::<Color>().is_err());
        assert!("#12345".parse::<Color>().is_err());
    }

    #[test]
    fn parses_css_keywords_and_alpha_hex() {
        let light = "lightgray".parse::<Color>().unwrap();
        assert_eq!(light.to_string(), "lightgray");
        assert!(matches!(light, Color::Keyword(k) if k.rgb() == [0xd3, 0xd3, 0xd3]));
        assert_eq!("DarkSlateGrey".parse::<Color>().unwrap().to_string(), "darkslategrey");
        assert_eq!(
            "#FFFFFF80".parse::<Color>().unwrap(),
            Color::Rgba { r: 255, g: 255, b: 255, a: 0x80 }
        );
        assert_eq!(
            "#f008".parse::<Color>().unwrap(),
            Color::Rgba { r: 255, g: 0, b: 0, a: 0x88 }
        );
        assert_eq!("#FFFFFF80".parse::<Color>().unwrap().to_string(), "#ffffff80");
    }

    #[test]
    fn parse_error_names_the_input() {
        let err = "nope".parse::<Color>().unwrap_err();
        assert_eq!(err.to_string(), "unrecognized color \"nope\"");
    }

    #[test]
    fn color_display_matches_authored_form() {
        assert_eq!(Color::default().to_string(), "blue");
        assert_eq!(Color::Rgb { r: 1, g: 2, b: 255 }.to_string(), "#0102ff");
    }

    #[test]
    fn activation_thresholds() {
        assert_eq!(Activation::from_amount(0.0), Activation::Inactive);
        assert_eq!(Activation::from_amount(-0.5), Activation::Inactive);
        assert_eq!(Activation::from_amount(0.01), Activation::Partial);
        assert_eq!(Activation::from_amount(0.99), Activation::Partial);
        assert_eq!(Activation::from_amount(1.0), Activation::Complete);
    }

    #[test]
    fn html_escapes_and_tags_each_line() {
        let mut trace = Trace::default();
        trace.push(0.0, "a<b".into());
        trace.push(0.5, "x & y".into());
        trace.push(1.0, "done;".into());
        assert_eq!(
            trace.to_html(),
            "<span class=\"c-zero\">a&lt;b</span><br/>\n\
             <span class=\"c-act\">x &amp; y</span><br/>\n\
             <span class=\"c-one\">done;</span><br/>"
        );
    }
}
