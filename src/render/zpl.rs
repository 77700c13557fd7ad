//! Label framing commands: preamble, encoding, barcode and postamble.

use super::canvas::Canvas;

/// Start of a label format.
pub const FORMAT_START: &str = "^XA";
/// End of a label format.
pub const FORMAT_END: &str = "^XZ";

/// Barcode origin offset from the right edge.
pub const BARCODE_RIGHT_OFFSET: u32 = 250;
/// Bar height of the CODE128 symbol.
pub const BARCODE_HEIGHT: u32 = 100;
/// Vertical band reserved for the barcode and its interpretation line.
pub const BARCODE_RESERVED: u32 = 150;

/// Character set commands by encoding name.
const ENCODINGS: &[(&str, &str)] = &[
    ("cp850", "^CI12"),
    ("cp852", "^CI13"),
    ("cp1250", "^CI2"),
    ("cp1252", "^CI8"),
    ("cp437", "^CI0"),
    ("utf8", "^CI28"),
    ("utf-8", "^CI28"),
];

/// Fallback when the encoding name is unknown.
pub const DEFAULT_ENCODING_COMMAND: &str = "^CI28";

/// Character set command for an encoding name (case-insensitive).
pub fn encoding_command(name: &str) -> &'static str {
    let name = name.trim().to_ascii_lowercase();
    match ENCODINGS.iter().find(|(n, _)| *n == name) {
        Some((_, command)) => *command,
        None => {
            log::warn!("Unknown encoding {:?}, using UTF-8", name);
            DEFAULT_ENCODING_COMMAND
        }
    }
}

/// Whether an encoding name is recognized.
pub fn is_known_encoding(name: &str) -> bool {
    let name = name.trim().to_ascii_lowercase();
    ENCODINGS.iter().any(|(n, _)| *n == name)
}

/// Format start, canvas size, origin, encoding and media type.
pub fn preamble(canvas: &Canvas, encoding: &str, print_speed: Option<u8>) -> Vec<String> {
    let mut commands = vec![
        FORMAT_START.to_string(),
        format!("^PW{}", canvas.width_dots),
        format!("^LL{}", canvas.height_dots),
        "^LH0,0".to_string(),
        encoding_command(encoding).to_string(),
        "^MTD".to_string(),
    ];
    if let Some(speed) = print_speed {
        commands.push(format!("^PR{}", speed));
    }
    commands
}

/// One label, then format end.
pub fn postamble() -> Vec<String> {
    vec!["^PQ1".to_string(), FORMAT_END.to_string()]
}

/// A CODE128 barcode field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarcodeField {
    pub x: u32,
    pub y: u32,
    pub data: String,
}

impl BarcodeField {
    /// Place a barcode in the top-right corner of the canvas.
    pub fn top_right(canvas: &Canvas, data: &str) -> Self {
        Self {
            x: canvas
                .width_dots
                .saturating_sub(BARCODE_RIGHT_OFFSET)
                .max(canvas.margin_dots),
            y: canvas.margin_dots,
            data: sanitize_barcode(data),
        }
    }

    /// First y available to body content.
    pub fn content_start(&self) -> u32 {
        self.y.saturating_add(BARCODE_RESERVED)
    }

    pub fn to_command(&self) -> String {
        format!(
            "^FO{},{}^BCN,{},Y,N,N^FD{}^FS",
            self.x, self.y, BARCODE_HEIGHT, self.data
        )
    }
}

/// Keep printable ASCII, the CODE128 character set, without command prefixes.
fn sanitize_barcode(data: &str) -> String {
    data.trim()
        .chars()
        .filter(|c| c.is_ascii_graphic() || *c == ' ')
        .filter(|c| *c != '^' && *c != '~')
        .collect()
}
