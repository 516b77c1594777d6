//! Style size specifications.

use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Target size of a style, parsed from `"WxH"` or `"!WxH"`.
///
/// A leading `!` turns off aspect-ratio preservation.
///
/// # Example
///
/// ```
/// use attachforge_common::SizeSpec;
///
/// let spec: SizeSpec = "150x75".parse().unwrap();
/// assert_eq!((spec.width, spec.height, spec.keep_ratio), (150, 75, true));
///
/// let exact: SizeSpec = "!100x60".parse().unwrap();
/// assert!(!exact.keep_ratio);
/// assert_eq!(exact.to_string(), "!100x60");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeSpec {
    pub width: u32,
    pub height: u32,
    pub keep_ratio: bool,
}

impl SizeSpec {
    pub fn new(width: u32, height: u32, keep_ratio: bool) -> Self {
        Self {
            width,
            height,
            keep_ratio,
        }
    }
}

impl FromStr for SizeSpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (keep_ratio, dims) = match trimmed.strip_prefix('!') {
            Some(rest) => (false, rest),
            None => (true, trimmed),
        };

        let (width, height) = dims
            .split_once('x')
            .ok_or_else(|| Error::invalid_size_spec(s, "missing 'x' separator"))?;

        let parse = |part: &str, axis: &str| -> Result<u32, Error> {
            let value: u32 = part
                .trim()
                .parse()
                .map_err(|_| Error::invalid_size_spec(s, format!("{axis} is not a number")))?;
            if value == 0 {
                return Err(Error::invalid_size_spec(s, format!("{axis} must be positive")));
            }
            Ok(value)
        };

        Ok(Self {
            width: parse(width, "width")?,
            height: parse(height, "height")?,
            keep_ratio,
        })
    }
}

impl fmt::Display for SizeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.keep_ratio {
            write!(f, "!")?;
        }
        write!(f, "{}x{}", self.width, self.height)
    }
}
