//! Device mode and screen orientation values
//!
//! Both travel as plain integers on the control channel. These enums name
//! the values the emulator control service recognizes.

use std::fmt;
use std::str::FromStr;

/// Physical form-factor state of a foldable device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum DeviceMode {
    Flat = 0,
    Tabletop = 1,
    Book = 2,
    Closed = 3,
}

impl DeviceMode {
    /// All recognized device modes
    pub const ALL: [DeviceMode; 4] = [
        DeviceMode::Flat,
        DeviceMode::Tabletop,
        DeviceMode::Book,
        DeviceMode::Closed,
    ];

    /// Integer value sent on the wire
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    pub fn name(self) -> &'static str {
        match self {
            DeviceMode::Flat => "flat",
            DeviceMode::Tabletop => "tabletop",
            DeviceMode::Book => "book",
            DeviceMode::Closed => "closed",
        }
    }
}

impl TryFrom<i32> for DeviceMode {
    type Error = i32;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        DeviceMode::ALL
            .into_iter()
            .find(|mode| mode.as_i32() == value)
            .ok_or(value)
    }
}

impl FromStr for DeviceMode {
    type Err = String;

    /// Accepts a mode name (case-insensitive) or its integer value
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(mode) = DeviceMode::ALL
            .into_iter()
            .find(|mode| mode.name().eq_ignore_ascii_case(s))
        {
            return Ok(mode);
        }
        s.parse::<i32>()
            .ok()
            .and_then(|v| DeviceMode::try_from(v).ok())
            .ok_or_else(|| format!("unknown device mode: {}", s))
    }
}

impl fmt::Display for DeviceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name(), self.as_i32())
    }
}

/// Screen orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ScreenOrientation {
    Portrait = 0,
    Landscape = 1,
}

impl ScreenOrientation {
    pub const ALL: [ScreenOrientation; 2] =
        [ScreenOrientation::Portrait, ScreenOrientation::Landscape];

    pub fn as_i32(self) -> i32 {
        self as i32
    }

    pub fn name(self) -> &'static str {
        match self {
            ScreenOrientation::Portrait => "portrait",
            ScreenOrientation::Landscape => "landscape",
        }
    }
}

impl TryFrom<i32> for ScreenOrientation {
    type Error = i32;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        ScreenOrientation::ALL
            .into_iter()
            .find(|o| o.as_i32() == value)
            .ok_or(value)
    }
}

impl FromStr for ScreenOrientation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(o) = ScreenOrientation::ALL
            .into_iter()
            .find(|o| o.name().eq_ignore_ascii_case(s))
        {
            return Ok(o);
        }
        s.parse::<i32>()
            .ok()
            .and_then(|v| ScreenOrientation::try_from(v).ok())
            .ok_or_else(|| format!("unknown screen orientation: {}", s))
    }
}

impl fmt::Display for ScreenOrientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name(), self.as_i32())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_mode_values() {
        assert_eq!(DeviceMode::Flat.as_i32(), 0);
        assert_eq!(DeviceMode::Tabletop.as_i32(), 1);
        assert_eq!(DeviceMode::Book.as_i32(), 2);
        assert_eq!(DeviceMode::Closed.as_i32(), 3);
    }

    #[test]
    fn test_device_mode_try_from_unknown() {
        assert_eq!(DeviceMode::try_from(-1), Err(-1));
        assert_eq!(DeviceMode::try_from(4), Err(4));
        assert_eq!(DeviceMode::try_from(2), Ok(DeviceMode::Book));
    }

    #[test]
    fn test_device_mode_parse() {
        assert_eq!("Tabletop".parse::<DeviceMode>(), Ok(DeviceMode::Tabletop));
        assert_eq!("3".parse::<DeviceMode>(), Ok(DeviceMode::Closed));
        assert!("folded".parse::<DeviceMode>().is_err());
        assert!("9".parse::<DeviceMode>().is_err());
    }

    #[test]
    fn test_orientation_parse() {
        assert_eq!(
            " landscape ".parse::<ScreenOrientation>(),
            Ok(ScreenOrientation::Landscape)
        );
        assert_eq!("0".parse::<ScreenOrientation>(), Ok(ScreenOrientation::Portrait));
        assert!("sideways".parse::<ScreenOrientation>().is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(DeviceMode::Closed.to_string(), "closed(3)");
        assert_eq!(ScreenOrientation::Landscape.to_string(), "landscape(1)");
    }
}
