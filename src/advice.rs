//! Static fly and species recommendations.
//!
//! Pure lookups keyed by river and, for the McKenzie, calendar month.
//! Rivers outside the registry get generic defaults.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::stations::{River, find_river};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlyRecommendation {
    pub method: &'static str,
    pub flies: Vec<&'static str>,
    pub tip: &'static str,
}

/// McKenzie patterns for a calendar month (1 = January).
pub fn seasonal_mckenzie_flies(month: u32) -> Vec<&'static str> {
    match month {
        1..=3 => vec![
            "Blue-winged Olive Parachute",
            "Pheasant Tail Nymph",
            "Black Elk Hair Caddis",
            "Sparkle Dun",
        ],
        4..=7 => vec!["Yellow Stimulators", "Turck's Tarantula", "Sofa Pillows", "Hairwing Drake"],
        8 => vec!["Elk Hair Caddis", "Yellow Stimulators", "Sparkle Dun", "Large Yellow Comparadun"],
        9..=11 => vec!["Blue-winged Olive Parachute", "Pheasant Tail Nymph", "Humpy's", "Adams"],
        _ => vec!["Pheasant Tail Nymph", "Adams"],
    }
}

/// Fly setup for a river on a given day.
pub fn recommend_fly_setup(river_id: &str, today: NaiveDate) -> FlyRecommendation {
    match find_river(river_id).map(|p| p.river) {
        Some(River::McKenzieHayden) => FlyRecommendation {
            method: "Dry/Dropper",
            flies: seasonal_mckenzie_flies(today.month()),
            tip: "Fish riffles and tailouts during warmer parts of the day.",
        },
        _ => FlyRecommendation {
            method: "Dry/Dropper",
            flies: vec!["Woolly Bugger", "Beadhead Prince", "Zebra Midge"],
            tip: "Focus on deep seams and slow eddies.",
        },
    }
}

/// Fish worth targeting on a river.
pub fn target_species(river_id: &str) -> Vec<&'static str> {
    match find_river(river_id).map(|p| p.river) {
        Some(River::McKenzieHayden) => vec!["Rainbow Trout", "Cutthroat Trout", "Whitefish"],
        Some(River::WillametteEugene) => vec!["Rainbow Trout", "Cutthroat Trout", "Steelhead"],
        None => vec!["Trout"],
    }
}
