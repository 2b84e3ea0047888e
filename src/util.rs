//! Helpers shared by the data writer and the solver output parsers

/// Longest identifier GAMS accepts
pub const MAX_IDENTIFIER_LENGTH: usize = 63;

/// Whether `name` is a valid GAMS identifier
///
/// ```
/// use gams_session::util::is_valid_identifier;
///
/// assert!(is_valid_identifier("x"));
/// assert!(is_valid_identifier("supply_2"));
/// assert!(!is_valid_identifier("2x")); // must start with a letter
/// assert!(!is_valid_identifier("a-b"));
/// assert!(!is_valid_identifier(""));
/// ```
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    name.len() <= MAX_IDENTIFIER_LENGTH && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Format a number the way GAMS reads it, including its special values
///
/// ```
/// use gams_session::util::format_number;
///
/// assert_eq!(format_number(2.0), "2");
/// assert_eq!(format_number(-0.25), "-0.25");
/// assert_eq!(format_number(1e-30), "1e-30");
/// assert_eq!(format_number(f64::INFINITY), "inf");
/// assert_eq!(format_number(f64::NEG_INFINITY), "-inf");
/// assert_eq!(format_number(f64::NAN), "na");
/// ```
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        "na".to_string()
    } else if value == f64::INFINITY {
        "inf".to_string()
    } else if value == f64::NEG_INFINITY {
        "-inf".to_string()
    } else if value != 0.0 && (value.abs() < 1e-6 || value.abs() >= 1e15) {
        format!("{:e}", value)
    } else {
        format!("{}", value)
    }
}

/// Parse a number as written by gdxdump, including its special values
pub fn parse_number(field: &str) -> Option<f64> {
    let field = field.trim();
    match field.to_ascii_uppercase().as_str() {
        "INF" | "+INF" => Some(f64::INFINITY),
        "-INF" => Some(f64::NEG_INFINITY),
        "EPS" => Some(0.0),
        "NA" | "UNDF" => Some(f64::NAN),
        _ => field.parse().ok(),
    }
}
