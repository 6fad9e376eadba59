//! Condition code to watch-face icon mapping.
//!
//! The watch font has one glyph per sky category, lower-case for day and
//! upper-case for night. Codes follow the WMO enumeration used by Open-Meteo:
//! <https://open-meteo.com/en/docs#weathervariables>

use thiserror::Error;

/// Sky categories the watch can draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IconCategory {
    Clear,
    PartlyCloudy,
    Cloudy,
    Overcast,
    Drizzle,
    Rain,
    Thunderstorm,
    Snow,
    Fog,
}

impl IconCategory {
    pub const fn all() -> &'static [IconCategory] {
        &[
            IconCategory::Clear,
            IconCategory::PartlyCloudy,
            IconCategory::Cloudy,
            IconCategory::Overcast,
            IconCategory::Drizzle,
            IconCategory::Rain,
            IconCategory::Thunderstorm,
            IconCategory::Snow,
            IconCategory::Fog,
        ]
    }

    pub fn from_wmo_code(code: i32) -> Result<Self, UnknownConditionCode> {
        let category = match code {
            0 => Self::Clear,
            1 => Self::PartlyCloudy,
            2 => Self::Cloudy,
            3 => Self::Overcast,
            51 | 53 | 55 | 56 | 57 => Self::Drizzle,
            61 | 63 | 65 | 66 | 67 | 80 | 81 | 82 => Self::Rain,
            95 | 96 | 99 => Self::Thunderstorm,
            71 | 73 | 75 | 77 | 85 | 86 => Self::Snow,
            45 | 48 => Self::Fog,
            other => return Err(UnknownConditionCode(other)),
        };

        Ok(category)
    }

    /// Daytime glyph letter.
    pub fn letter(&self) -> char {
        match self {
            Self::Clear => 'a',
            Self::PartlyCloudy => 'b',
            Self::Cloudy => 'c',
            Self::Overcast => 'd',
            Self::Drizzle => 'e',
            Self::Rain => 'f',
            Self::Thunderstorm => 'g',
            Self::Snow => 'h',
            Self::Fog => 'i',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unknown weather condition code {0}")]
pub struct UnknownConditionCode(pub i32);

/// A single glyph identifier in the watch's weather font.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IconId(char);

impl IconId {
    pub(crate) fn from_char(c: char) -> Self {
        Self(c)
    }

    pub fn as_char(&self) -> char {
        self.0
    }

    /// Value sent over the wire; the watch indexes its font by code point.
    pub fn ordinal(&self) -> u32 {
        u32::from(self.0)
    }
}

/// Every condition code the provider documents.
pub const KNOWN_CONDITION_CODES: &[i32] = &[
    0, 1, 2, 3, 45, 48, 51, 53, 55, 56, 57, 61, 63, 65, 66, 67, 71, 73, 75, 77, 80, 81, 82, 85,
    86, 95, 96, 99,
];

pub fn map_icon(code: i32, is_day: bool) -> Result<IconId, UnknownConditionCode> {
    let letter = IconCategory::from_wmo_code(code)?.letter();
    let letter = if is_day {
        letter
    } else {
        letter.to_ascii_uppercase()
    };

    Ok(IconId::from_char(letter))
}
