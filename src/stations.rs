/// River profile registry for the river conditions service.
///
/// Defines the fixed set of rivers this service reports on, along with the
/// telemetry feeds that supply each one, its coordinates, and its flow
/// classification thresholds. This is the single source of truth for
/// station identifiers; other modules reference rivers from here rather
/// than hardcoding codes.

use std::collections::HashSet;

use thiserror::Error;

use crate::model::{FlowThresholds, SourceKind};

pub use crate::model::{PARAM_DISCHARGE, PARAM_WATER_TEMP};

// ---------------------------------------------------------------------------
// Feed metadata
// ---------------------------------------------------------------------------

/// One upstream station that contributes data to a river, tagged by the
/// adapter that knows how to read it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StationFeed {
    /// USGS NWIS instantaneous values.
    Usgs {
        /// 8-digit USGS site code.
        site_code: &'static str,
        /// Parameter codes requested from this site.
        parameters: &'static [&'static str],
        /// ISO 8601 lookback period (e.g. "P2D"). `None` asks for the
        /// latest value only.
        period: Option<&'static str>,
    },
    /// NWRFC hydromet XML bulletin.
    Nwrfc {
        /// NWS location identifier (e.g. "EUGO3").
        station_id: &'static str,
        /// Physical element code passed as `pe`.
        physical_element: &'static str,
        /// Days of observations to request.
        days: u32,
    },
}

impl StationFeed {
    pub fn source(&self) -> SourceKind {
        match self {
            StationFeed::Usgs { .. } => SourceKind::Usgs,
            StationFeed::Nwrfc { .. } => SourceKind::Nwrfc,
        }
    }

    pub fn station_id(&self) -> &'static str {
        match self {
            StationFeed::Usgs { site_code, .. } => *site_code,
            StationFeed::Nwrfc { station_id, .. } => *station_id,
        }
    }
}

// ---------------------------------------------------------------------------
// River metadata
// ---------------------------------------------------------------------------

/// Every river the service knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum River {
    McKenzieHayden,
    WillametteEugene,
}

impl River {
    pub const ALL: [River; 2] = [River::McKenzieHayden, River::WillametteEugene];

    pub fn profile(self) -> &'static RiverProfile {
        match self {
            River::McKenzieHayden => &MCKENZIE_HAYDEN,
            River::WillametteEugene => &WILLAMETTE_EUGENE,
        }
    }

    pub fn id(self) -> &'static str {
        self.profile().id
    }
}

/// Static metadata for one river.
#[derive(Debug)]
pub struct RiverProfile {
    pub river: River,
    /// Canonical lowercase identifier used in requests.
    pub id: &'static str,
    pub name: &'static str,
    /// WGS84 latitude.
    pub latitude: f64,
    /// WGS84 longitude.
    pub longitude: f64,
    pub feeds: &'static [StationFeed],
    pub thresholds: FlowThresholds,
}

static MCKENZIE_HAYDEN: RiverProfile = RiverProfile {
    river: River::McKenzieHayden,
    id: "mckenzie_hayden",
    name: "McKenzie River at Hayden Bridge, OR",
    latitude: 44.093,
    longitude: -122.973,
    // Discharge and temperature both come from the same USGS site.
    feeds: &[StationFeed::Usgs {
        site_code: "14164900",
        parameters: &[PARAM_DISCHARGE, PARAM_WATER_TEMP],
        period: Some("P2D"),
    }],
    thresholds: FlowThresholds {
        low: 900.0,
        optimal_low: 1000.0,
        optimal_high: 2500.0,
        high: 3000.0,
    },
};

static WILLAMETTE_EUGENE: RiverProfile = RiverProfile {
    river: River::WillametteEugene,
    id: "willamette_eugene",
    name: "Willamette River at Eugene, OR",
    latitude: 44.058,
    longitude: -123.092,
    // USGS 14158050 only reports temperature; discharge comes from the
    // NWRFC bulletin for EUGO3.
    feeds: &[
        StationFeed::Usgs {
            site_code: "14158050",
            parameters: &[PARAM_WATER_TEMP],
            period: None,
        },
        StationFeed::Nwrfc {
            station_id: "EUGO3",
            physical_element: "HG",
            days: 2,
        },
    ],
    thresholds: FlowThresholds {
        low: 1000.0,
        optimal_low: 2000.0,
        optimal_high: 4000.0,
        high: 5000.0,
    },
};

/// Looks up a river by identifier, ignoring case and surrounding
/// whitespace. Returns `None` for rivers outside the registry.
pub fn find_river(id: &str) -> Option<&'static RiverProfile> {
    let wanted = id.trim();
    River::ALL
        .iter()
        .map(|r| r.profile())
        .find(|p| p.id.eq_ignore_ascii_case(wanted))
}

/// Returns the identifiers of every configured river.
pub fn all_river_ids() -> Vec<&'static str> {
    River::ALL.iter().map(|r| r.id()).collect()
}

/// A registry entry that breaks one of the registry's invariants.
#[derive(Debug, Error, PartialEq)]
pub enum RegistryError {
    #[error("river registry: profile '{0}' is filed under the wrong river")]
    MisfiledProfile(&'static str),
    #[error("river registry: duplicate river id '{0}'")]
    DuplicateId(&'static str),
    #[error("river registry: river id '{0}' must be lowercase")]
    NotLowercase(&'static str),
    #[error("river registry: river '{0}' has no telemetry feeds")]
    NoFeeds(&'static str),
    #[error("river registry: thresholds for '{0}' must satisfy low < optimal_low <= optimal_high < high")]
    UnorderedThresholds(&'static str),
}

/// Checks the registry's invariants. Run once at start-up so a bad entry
/// is caught before the first request rather than during one.
pub fn validate_registry() -> Result<(), RegistryError> {
    validate_profiles(River::ALL.iter().map(|river| (*river, river.profile())))
}

/// Checks `(river, profile)` entries as the registry would file them.
pub fn validate_profiles<'a>(
    entries: impl IntoIterator<Item = (River, &'a RiverProfile)>,
) -> Result<(), RegistryError> {
    let mut seen = HashSet::new();
    for (river, p) in entries {
        if p.river != river {
            return Err(RegistryError::MisfiledProfile(p.id));
        }
        if !seen.insert(p.id) {
            return Err(RegistryError::DuplicateId(p.id));
        }
        if p.id != p.id.to_ascii_lowercase() {
            return Err(RegistryError::NotLowercase(p.id));
        }
        if p.feeds.is_empty() {
            return Err(RegistryError::NoFeeds(p.id));
        }
        if !p.thresholds.is_well_ordered() {
            return Err(RegistryError::UnorderedThresholds(p.id));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_passes_validation() {
        assert_eq!(validate_registry(), Ok(()));
    }

    fn profile_with(id: &'static str, feeds: &'static [StationFeed], thresholds: FlowThresholds) -> RiverProfile {
        RiverProfile {
            river: River::McKenzieHayden,
            id,
            name: "Test River",
            latitude: 44.0,
            longitude: -123.0,
            feeds,
            thresholds,
        }
    }

    #[test]
    fn test_bad_profiles_are_rejected() {
        let good = River::McKenzieHayden.profile();
        let feeds = good.feeds;
        let t = good.thresholds;

        let upper = profile_with("McKenzie_Hayden", feeds, t);
        assert_eq!(
            validate_profiles([(River::McKenzieHayden, &upper)]),
            Err(RegistryError::NotLowercase("McKenzie_Hayden"))
        );

        let bare = profile_with("bare_river", &[], t);
        assert_eq!(validate_profiles([(River::McKenzieHayden, &bare)]), Err(RegistryError::NoFeeds("bare_river")));

        let inverted = profile_with("inverted", feeds, FlowThresholds { low: 3000.0, ..t });
        assert_eq!(
            validate_profiles([(River::McKenzieHayden, &inverted)]),
            Err(RegistryError::UnorderedThresholds("inverted"))
        );

        assert_eq!(
            validate_profiles([(River::McKenzieHayden, good), (River::McKenzieHayden, good)]),
            Err(RegistryError::DuplicateId("mckenzie_hayden"))
        );
        assert_eq!(
            validate_profiles([(River::WillametteEugene, good)]),
            Err(RegistryError::MisfiledProfile("mckenzie_hayden"))
        );
    }

    #[test]
    fn test_find_river_is_case_insensitive() {
        let profile = find_river("McKenzie_Hayden").expect("McKenzie should be in registry");
        assert_eq!(profile.river, River::McKenzieHayden);
        assert!(find_river("  WILLAMETTE_EUGENE ").is_some());
    }

    #[test]
    fn test_find_river_returns_none_for_unknown_id() {
        assert!(find_river("columbia_xyz").is_none());
        assert!(find_river("").is_none());
    }

    #[test]
    fn test_usgs_site_codes_are_valid_format() {
        // A malformed site code is silently dropped by the IV service.
        for river in River::ALL {
            for feed in river.profile().feeds {
                if let StationFeed::Usgs { site_code, parameters, .. } = feed {
                    assert_eq!(site_code.len(), 8, "site code for '{}' should be 8 digits", river.id());
                    assert!(site_code.chars().all(|c| c.is_ascii_digit()));
                    assert!(!parameters.is_empty());
                }
            }
        }
    }

    #[test]
    fn test_willamette_uses_both_feed_kinds() {
        let kinds: Vec<_> = River::WillametteEugene
            .profile()
            .feeds
            .iter()
            .map(|f| f.source())
            .collect();
        assert_eq!(kinds, vec![SourceKind::Usgs, SourceKind::Nwrfc]);
    }

    #[test]
    fn test_mckenzie_thresholds_match_published_bands() {
        let t = River::McKenzieHayden.profile().thresholds;
        assert_eq!(t.low, 900.0);
        assert_eq!(t.optimal_low, 1000.0);
        assert_eq!(t.optimal_high, 2500.0);
        assert_eq!(t.high, 3000.0);
    }

    #[test]
    fn test_all_river_ids_matches_registry_length() {
        assert_eq!(all_river_ids().len(), River::ALL.len());
    }
}
