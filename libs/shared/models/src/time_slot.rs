use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The six bookable consultation hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TimeSlot {
    NineToTen,
    TenToEleven,
    ElevenToTwelve,
    OneToTwo,
    TwoToThree,
    ThreeToFour,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{0}' is not one of the available time slots")]
pub struct InvalidTimeSlot(pub String);

impl TimeSlot {
    pub const ALL: [TimeSlot; 6] = [
        TimeSlot::NineToTen,
        TimeSlot::TenToEleven,
        TimeSlot::ElevenToTwelve,
        TimeSlot::OneToTwo,
        TimeSlot::TwoToThree,
        TimeSlot::ThreeToFour,
    ];

    /// Canonical stored form, the slot's start time.
    pub fn label(self) -> &'static str {
        match self {
            TimeSlot::NineToTen => "9:00 AM",
            TimeSlot::TenToEleven => "10:00 AM",
            TimeSlot::ElevenToTwelve => "11:00 AM",
            TimeSlot::OneToTwo => "1:00 PM",
            TimeSlot::TwoToThree => "2:00 PM",
            TimeSlot::ThreeToFour => "3:00 PM",
        }
    }

    pub fn range_label(self) -> &'static str {
        match self {
            TimeSlot::NineToTen => "9:00 AM - 10:00 AM",
            TimeSlot::TenToEleven => "10:00 AM - 11:00 AM",
            TimeSlot::ElevenToTwelve => "11:00 AM - 12:00 PM",
            TimeSlot::OneToTwo => "1:00 PM - 2:00 PM",
            TimeSlot::TwoToThree => "2:00 PM - 3:00 PM",
            TimeSlot::ThreeToFour => "3:00 PM - 4:00 PM",
        }
    }

    pub fn short_label(self) -> &'static str {
        match self {
            TimeSlot::NineToTen => "9-10",
            TimeSlot::TenToEleven => "10-11",
            TimeSlot::ElevenToTwelve => "11-12",
            TimeSlot::OneToTwo => "1-2",
            TimeSlot::TwoToThree => "2-3",
            TimeSlot::ThreeToFour => "3-4",
        }
    }
}

// Drops whitespace, folds en dashes and case so "9–10", "9 - 10" and "9-10" compare equal.
fn normalize(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == '\u{2013}' { '-' } else { c.to_ascii_uppercase() })
        .collect()
}

impl FromStr for TimeSlot {
    type Err = InvalidTimeSlot;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize(s);
        if wanted.is_empty() {
            return Err(InvalidTimeSlot(s.to_string()));
        }

        TimeSlot::ALL
            .into_iter()
            .find(|slot| {
                [slot.label(), slot.range_label(), slot.short_label()]
                    .iter()
                    .any(|form| normalize(form) == wanted)
            })
            .ok_or_else(|| InvalidTimeSlot(s.to_string()))
    }
}

impl TryFrom<String> for TimeSlot {
    type Error = InvalidTimeSlot;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeSlot> for String {
    fn from(slot: TimeSlot) -> Self {
        slot.label().to_string()
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_accepted_form() {
        assert_eq!("9:00 AM".parse(), Ok(TimeSlot::NineToTen));
        assert_eq!("9:00 am - 10:00 am".parse(), Ok(TimeSlot::NineToTen));
        assert_eq!("11\u{2013}12".parse(), Ok(TimeSlot::ElevenToTwelve));
        assert_eq!("3 - 4".parse(), Ok(TimeSlot::ThreeToFour));
    }

    #[test]
    fn rejects_unknown_and_empty_slots() {
        assert!("12-1".parse::<TimeSlot>().is_err());
        assert!("4:00 PM".parse::<TimeSlot>().is_err());
        assert!("   ".parse::<TimeSlot>().is_err());
    }

    #[test]
    fn stored_form_round_trips_through_serde() {
        let json = serde_json::to_string(&TimeSlot::OneToTwo).unwrap();
        assert_eq!(json, "\"1:00 PM\"");
        let back: TimeSlot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, TimeSlot::OneToTwo);
    }
}
