//! Byte-rate unit conversion for dual metric text.
//!
//! Byte units are binary (`1 KB/s = 1024 B/s`); `Mbps` is decimal megabits
//! (`bytes * 8 / 1e6`). `auto` picks the largest byte unit that keeps the
//! value at or above 1.

use std::fmt;
use std::str::FromStr;

use crate::error::WidgetError;

const KIB: f64 = 1024.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RateUnit {
    BytesPerSec,
    KiloBytesPerSec,
    MegaBytesPerSec,
    GigaBytesPerSec,
    MegaBitsPerSec,
    #[default]
    Auto,
}

impl RateUnit {
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::BytesPerSec => "B/s",
            Self::KiloBytesPerSec => "KB/s",
            Self::MegaBytesPerSec => "MB/s",
            Self::GigaBytesPerSec => "GB/s",
            Self::MegaBitsPerSec => "Mbps",
            Self::Auto => "",
        }
    }

    /// Convert `bytes_per_sec` into this unit, resolving `Auto` per value.
    pub fn convert(
        self,
        bytes_per_sec: f64,
    ) -> (f64, RateUnit) {
        let v = bytes_per_sec.max(0.0);
        match self {
            Self::BytesPerSec => (v, self),
            Self::KiloBytesPerSec => (v / KIB, self),
            Self::MegaBytesPerSec => (v / (KIB * KIB), self),
            Self::GigaBytesPerSec => (v / (KIB * KIB * KIB), self),
            Self::MegaBitsPerSec => (v * 8.0 / 1_000_000.0, self),
            Self::Auto => {
                let unit = if v < KIB {
                    Self::BytesPerSec
                } else if v < KIB * KIB {
                    Self::KiloBytesPerSec
                } else if v < KIB * KIB * KIB {
                    Self::MegaBytesPerSec
                } else {
                    Self::GigaBytesPerSec
                };
                unit.convert(v)
            }
        }
    }
}

impl FromStr for RateUnit {
    type Err = WidgetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "auto" | "" => Ok(Self::Auto),
            "B/s" | "bps" => Ok(Self::BytesPerSec),
            "KB/s" | "kB/s" => Ok(Self::KiloBytesPerSec),
            "MB/s" => Ok(Self::MegaBytesPerSec),
            "GB/s" => Ok(Self::GigaBytesPerSec),
            "Mbps" | "mbps" => Ok(Self::MegaBitsPerSec),
            other => Err(WidgetError::Config(format!("unknown rate unit `{other}`"))),
        }
    }
}

impl fmt::Display for RateUnit {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::Auto => f.write_str("auto"),
            other => f.write_str(other.suffix()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_picks_unit_per_value() {
        assert_eq!(RateUnit::Auto.convert(512.0), (512.0, RateUnit::BytesPerSec));
        assert_eq!(RateUnit::Auto.convert(2048.0), (2.0, RateUnit::KiloBytesPerSec));
        assert_eq!(RateUnit::Auto.convert(3.0 * 1024.0 * 1024.0), (3.0, RateUnit::MegaBytesPerSec));
        assert_eq!(RateUnit::Auto.convert(1024.0).1, RateUnit::KiloBytesPerSec, "Threshold is inclusive");
    }

    #[test]
    fn test_megabits() {
        assert_eq!(RateUnit::MegaBitsPerSec.convert(125_000.0).0, 1.0);
    }

    #[test]
    fn test_negative_rates_clamp_to_zero() {
        assert_eq!(RateUnit::KiloBytesPerSec.convert(-10.0).0, 0.0);
    }

    #[test]
    fn test_parse() {
        assert_eq!("Mbps".parse::<RateUnit>(), Ok(RateUnit::MegaBitsPerSec));
        assert_eq!("MB/s".parse::<RateUnit>(), Ok(RateUnit::MegaBytesPerSec));
        assert_eq!("auto".parse::<RateUnit>(), Ok(RateUnit::Auto));
        assert!("furlongs".parse::<RateUnit>().is_err());
        assert_eq!(RateUnit::KiloBytesPerSec.to_string(), "KB/s");
    }
}
