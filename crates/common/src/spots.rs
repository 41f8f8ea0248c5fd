//! Venue spot catalog for the Lucky Launch layout.
//!
//! Ported from the published layout plan: 23 numbered spots across six
//! areas. Spots 19-23 are sold as the Trunk Package, which only operates
//! on 24 & 26 Oktober.

use crate::types::DurationCode;

/// The closed set of calendar dates the event runs on.
pub const EVENT_DATES: [&str; 3] = ["24 Oktober", "25 Oktober", "26 Oktober"];

/// Dates a Trunk Package booking can occupy — the trunk zone is closed on
/// the middle day.
pub const TRUNK_DATES: [&str; 2] = ["24 Oktober", "26 Oktober"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpotCategory {
    PopUpMarket,
    TrunkPackage,
}

impl SpotCategory {
    /// Duration options the registration form may offer for this category.
    pub fn duration_options(self) -> &'static [DurationCode] {
        match self {
            SpotCategory::PopUpMarket => &[
                DurationCode::ThreeDayFull,
                DurationCode::ThreeDayPartial,
                DurationCode::OneDay,
            ],
            SpotCategory::TrunkPackage => &[DurationCode::TwoDay, DurationCode::OneDay],
        }
    }

    /// Calendar dates a booking of `code` occupies, or `None` when the
    /// code is not sold for this category. One-day bookings take the
    /// opening date.
    pub fn dates_for(self, code: DurationCode) -> Option<&'static [&'static str]> {
        match (self, code) {
            (SpotCategory::PopUpMarket, DurationCode::ThreeDayFull)
            | (SpotCategory::PopUpMarket, DurationCode::ThreeDayPartial) => Some(&EVENT_DATES[..]),
            (SpotCategory::PopUpMarket, DurationCode::OneDay) => Some(&EVENT_DATES[..1]),
            (SpotCategory::TrunkPackage, DurationCode::TwoDay) => Some(&TRUNK_DATES[..]),
            (SpotCategory::TrunkPackage, DurationCode::OneDay) => Some(&TRUNK_DATES[..1]),
            _ => None,
        }
    }
}

/// Per-duration pricing in rupiah.
#[derive(Debug, Clone, Copy)]
pub struct SpotPrice {
    pub three_day: i64,
    pub two_day: i64,
    pub one_day: i64,
}

/// A bookable venue spot.
#[derive(Debug, Clone)]
pub struct SpotInfo {
    pub id: &'static str,
    pub number: u32,
    pub area: &'static str,
    pub size: &'static str,
    pub price: SpotPrice,
}

impl SpotInfo {
    pub fn category(&self) -> SpotCategory {
        if (19..=23).contains(&self.number) {
            SpotCategory::TrunkPackage
        } else {
            SpotCategory::PopUpMarket
        }
    }

    /// Base price for a duration, or `None` when the duration is not sold
    /// for this spot's category. `threeDayPartial` runs all three days at
    /// reduced hours and bills at the two-day rate.
    pub fn base_price(&self, code: DurationCode) -> Option<i64> {
        self.category().dates_for(code)?;
        Some(match code {
            DurationCode::ThreeDayFull => self.price.three_day,
            DurationCode::ThreeDayPartial | DurationCode::TwoDay => self.price.two_day,
            DurationCode::OneDay => self.price.one_day,
        })
    }
}

const P_HIGH: SpotPrice = SpotPrice { three_day: 400_000, two_day: 325_000, one_day: 225_000 };
const P_MID: SpotPrice = SpotPrice { three_day: 300_000, two_day: 250_000, one_day: 200_000 };
const P_SMALL: SpotPrice = SpotPrice { three_day: 300_000, two_day: 250_000, one_day: 175_000 };
const P_MINI: SpotPrice = SpotPrice { three_day: 250_000, two_day: 200_000, one_day: 150_000 };
const P_OUTDOOR: SpotPrice = SpotPrice { three_day: 0, two_day: 0, one_day: 300_000 };

/// All 23 spots on the venue layout.
pub const SPOTS: [SpotInfo; 23] = [
    // Parking area
    SpotInfo { id: "spot-1", number: 1, area: "Parking Area", size: "3x3m", price: P_HIGH },
    SpotInfo { id: "spot-2", number: 2, area: "Parking Area", size: "3x3m", price: P_HIGH },
    // Hallway
    SpotInfo { id: "spot-3", number: 3, area: "Hallway", size: "3x3m", price: P_MID },
    SpotInfo { id: "spot-4", number: 4, area: "Hallway", size: "3x3m", price: P_MID },
    SpotInfo { id: "spot-5", number: 5, area: "Hallway", size: "3x3m", price: P_MID },
    SpotInfo { id: "spot-6", number: 6, area: "Hallway", size: "3x3m", price: P_MID },
    SpotInfo { id: "spot-7", number: 7, area: "Hallway", size: "3x3m", price: P_MID },
    // Indoor, extra bar
    SpotInfo { id: "spot-8", number: 8, area: "Extra Bar", size: "3x3m", price: P_HIGH },
    SpotInfo { id: "spot-9", number: 9, area: "Extra Bar", size: "3x3m", price: P_HIGH },
    SpotInfo { id: "spot-10", number: 10, area: "Extra Bar", size: "3x3m", price: P_HIGH },
    SpotInfo { id: "spot-11", number: 11, area: "Extra Bar", size: "3x3m", price: P_HIGH },
    // Indoor, bar
    SpotInfo { id: "spot-12", number: 12, area: "Bar", size: "3x3m", price: P_HIGH },
    SpotInfo { id: "spot-13", number: 13, area: "Bar", size: "2x2m", price: P_SMALL },
    SpotInfo { id: "spot-14", number: 14, area: "Bar", size: "2x2m", price: P_SMALL },
    SpotInfo { id: "spot-15", number: 15, area: "Bar", size: "2x2m", price: P_SMALL },
    SpotInfo { id: "spot-16", number: 16, area: "Bar", size: "1x1m", price: P_MINI },
    // Indoor, back area
    SpotInfo { id: "spot-17", number: 17, area: "Area Belakang", size: "3x3m", price: P_MID },
    SpotInfo { id: "spot-18", number: 18, area: "Area Belakang", size: "3x3m", price: P_MID },
    // Trunk package
    SpotInfo { id: "spot-19", number: 19, area: "Area Belakang", size: "Trunk-Package", price: P_MID },
    SpotInfo { id: "spot-20", number: 20, area: "Area Belakang", size: "Trunk-Package", price: P_MID },
    SpotInfo { id: "spot-21", number: 21, area: "Outdoor", size: "Trunk-Package", price: P_OUTDOOR },
    SpotInfo { id: "spot-22", number: 22, area: "Outdoor", size: "Trunk-Package", price: P_OUTDOOR },
    SpotInfo { id: "spot-23", number: 23, area: "Outdoor", size: "Trunk-Package", price: P_OUTDOOR },
];

/// Look up a spot by its `spot-N` identifier.
pub fn spot(id: &str) -> Option<&'static SpotInfo> {
    SPOTS.iter().find(|s| s.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trunk_spots_are_19_through_23() {
        for s in &SPOTS {
            let expected = (19..=23).contains(&s.number);
            assert_eq!(
                s.category() == SpotCategory::TrunkPackage,
                expected,
                "wrong category for {}",
                s.id
            );
        }
    }

    #[test]
    fn trunk_dates_skip_the_middle_day() {
        let dates = SpotCategory::TrunkPackage
            .dates_for(DurationCode::TwoDay)
            .unwrap();
        assert_eq!(dates, ["24 Oktober", "26 Oktober"]);
        assert!(!dates.contains(&"25 Oktober"));
    }

    #[test]
    fn duration_codes_are_category_specific() {
        assert!(SpotCategory::PopUpMarket
            .dates_for(DurationCode::TwoDay)
            .is_none());
        assert!(SpotCategory::TrunkPackage
            .dates_for(DurationCode::ThreeDayFull)
            .is_none());
        assert!(SpotCategory::TrunkPackage
            .dates_for(DurationCode::OneDay)
            .is_some());

        // Every offered option must have a date set, and vice versa.
        for cat in [SpotCategory::PopUpMarket, SpotCategory::TrunkPackage] {
            for code in cat.duration_options() {
                assert!(cat.dates_for(*code).is_some(), "{:?} missing dates", code);
                assert!(!code.label().is_empty());
            }
        }
        assert_eq!(SpotCategory::TrunkPackage.duration_options().len(), 2);
    }

    #[test]
    fn partial_three_day_bills_at_two_day_rate() {
        let s = spot("spot-3").unwrap();
        assert_eq!(s.base_price(DurationCode::ThreeDayPartial), Some(250_000));
        assert_eq!(s.base_price(DurationCode::ThreeDayFull), Some(300_000));
        assert_eq!(s.base_price(DurationCode::TwoDay), None);
    }

    #[test]
    fn unknown_spot_lookup_is_none() {
        assert!(spot("spot-99").is_none());
        assert!(spot("").is_none());
    }
}
