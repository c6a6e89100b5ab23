use std::{fmt::Display, ops::Deref, str::FromStr};

use anyhow::anyhow;

/// A non-negative amount of hours, as accepted from the command line.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Hours(f64);

impl Display for Hours {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}h", self.0)
    }
}

impl Hours {
    pub fn new_opt(value: f64) -> Option<Hours> {
        if value.is_finite() && value >= 0. {
            Some(Hours(value))
        } else {
            None
        }
    }
}

impl FromStr for Hours {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim_end_matches("h");
        let v = s.parse::<f64>()?;
        Hours::new_opt(v).ok_or_else(|| anyhow!("Can't parse {s} into hours"))
    }
}

impl Deref for Hours {
    type Target = f64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::Hours;

    #[test]
    fn test_parse_hours() {
        assert_eq!(*"7.5".parse::<Hours>().unwrap(), 7.5);
        assert_eq!(*"40h".parse::<Hours>().unwrap(), 40.);
        assert_eq!(*"0".parse::<Hours>().unwrap(), 0.);
    }

    #[test]
    fn test_reject_negative_hours() {
        assert!("-1".parse::<Hours>().is_err());
        assert!("abc".parse::<Hours>().is_err());
        assert!(Hours::new_opt(f64::NAN).is_none());
    }
}
