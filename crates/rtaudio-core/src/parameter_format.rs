//! Parameter value formatting and parsing.
//!
//! The formatter separates value formatting from unit strings:
//! - `text()` returns the bare value without units (e.g., "-6.00")
//! - `unit()` returns the unit string (e.g., "dB")
//!
//! The host combines them for display.
//!
//! # Example
//!
//! ```
//! use rtaudio_core::Formatter;
//!
//! let db = Formatter::DecibelDirect { precision: 2, min_db: -70.0 };
//! assert_eq!(db.text(-6.0), "-6.00");
//! assert_eq!(db.text(0.0), "+0.00");
//! assert_eq!(db.unit(), "dB");
//! ```

/// Parameter value formatter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Formatter {
    /// Generic float with configurable precision (e.g., "1.23").
    Float {
        /// Number of decimal places.
        precision: usize,
    },

    /// Decibel formatter where the plain value is already in dB.
    ///
    /// Format: "+12.00", "-60.00", "-inf" below `min_db` (unit "dB").
    DecibelDirect {
        /// Number of decimal places.
        precision: usize,
        /// Minimum dB value (below this shows "-inf")
        min_db: f64,
    },
}

impl Formatter {
    /// Convert a plain value to a display string (without unit).
    pub fn text(&self, value: f64) -> String {
        match self {
            Formatter::Float { precision } => {
                format!("{:.prec$}", value, prec = *precision)
            }

            Formatter::DecibelDirect { precision, min_db } => {
                // Strict less-than so that min_db itself displays as a number
                if value < *min_db {
                    "-inf".to_string()
                } else if value >= 0.0 {
                    format!("+{:.prec$}", value, prec = *precision)
                } else {
                    format!("{:.prec$}", value, prec = *precision)
                }
            }
        }
    }

    /// Parse a display string to a plain value.
    ///
    /// Returns `None` if the string cannot be parsed.
    pub fn parse(&self, s: &str) -> Option<f64> {
        let s = s.trim();

        match self {
            Formatter::Float { .. } => s.parse().ok(),

            Formatter::DecibelDirect { min_db, .. } => {
                let trimmed = s
                    .trim_end_matches(" dB")
                    .trim_end_matches("dB")
                    .trim();

                if trimmed.eq_ignore_ascii_case("-inf")
                    || trimmed.eq_ignore_ascii_case("-∞")
                    || trimmed == "-infinity"
                {
                    return Some(*min_db);
                }

                trimmed.parse().ok()
            }
        }
    }

    /// Get the unit string for this formatter.
    pub fn unit(&self) -> &'static str {
        match self {
            Formatter::Float { .. } => "",
            Formatter::DecibelDirect { .. } => "dB",
        }
    }

    /// Return a copy of this formatter with a different precision.
    pub fn with_precision(self, precision: usize) -> Self {
        match self {
            Formatter::Float { .. } => Formatter::Float { precision },
            Formatter::DecibelDirect { min_db, .. } => {
                Formatter::DecibelDirect { precision, min_db }
            }
        }
    }
}

impl Default for Formatter {
    fn default() -> Self {
        Formatter::Float { precision: 2 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decibel_direct_text() {
        let f = Formatter::DecibelDirect {
            precision: 2,
            min_db: -70.0,
        };
        assert_eq!(f.text(12.0), "+12.00");
        assert_eq!(f.text(-70.0), "-70.00");
        assert_eq!(f.text(-70.5), "-inf");
        assert_eq!(f.text(-0.01), "-0.01");
    }

    #[test]
    fn test_decibel_direct_parse() {
        let f = Formatter::DecibelDirect {
            precision: 2,
            min_db: -70.0,
        };
        assert_eq!(f.parse("-6.5 dB"), Some(-6.5));
        assert_eq!(f.parse("+3dB"), Some(3.0));
        assert_eq!(f.parse("-inf"), Some(-70.0));
        assert_eq!(f.parse("loud"), None);
    }

    #[test]
    fn test_float_text_and_parse() {
        let f = Formatter::Float { precision: 3 };
        assert_eq!(f.text(1.23456), "1.235");
        assert_eq!(f.parse(" 0.5 "), Some(0.5));
        assert_eq!(f.unit(), "");
    }

    #[test]
    fn test_with_precision() {
        let f = Formatter::DecibelDirect {
            precision: 1,
            min_db: -60.0,
        }
        .with_precision(3);
        assert_eq!(f.text(-1.0), "-1.000");
    }
}
