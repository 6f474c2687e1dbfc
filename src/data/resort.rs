//! Static ski resort data for the Bavarian and Tyrolean Alps
//!
//! This module contains the static list of supported ski resorts with
//! their geographic coordinates and snow-report page URLs.

use super::Resort;

/// Static array of all supported ski resorts
///
/// Contains 14 resorts in the Bavarian and Tyrolean Alps with accurate
/// base-station coordinates and the URL of each resort's own
/// snow-conditions page.
pub static RESORTS: [Resort; 14] = [
    Resort {
        id: "garmisch-classic",
        name: "Garmisch-Classic",
        latitude: 47.4928,
        longitude: 11.0620,
        snow_report_url: "https://zugspitze.de/en/snow-report",
    },
    Resort {
        id: "zugspitze",
        name: "Zugspitze",
        latitude: 47.4212,
        longitude: 10.9863,
        snow_report_url: "https://zugspitze.de/en/snow-report-zugspitze",
    },
    Resort {
        id: "brauneck",
        name: "Brauneck",
        latitude: 47.6746,
        longitude: 11.5558,
        snow_report_url: "https://www.brauneck-bergbahn.de/schneebericht",
    },
    Resort {
        id: "spitzingsee",
        name: "Spitzingsee-Tegernsee",
        latitude: 47.6660,
        longitude: 11.8860,
        snow_report_url: "https://www.alpenbahnen-spitzingsee.de/schneebericht",
    },
    Resort {
        id: "sudelfeld",
        name: "Sudelfeld",
        latitude: 47.6703,
        longitude: 12.0399,
        snow_report_url: "https://www.sudelfeld.de/schneebericht",
    },
    Resort {
        id: "oberaudorf",
        name: "Oberaudorf-Hocheck",
        latitude: 47.6483,
        longitude: 12.1702,
        snow_report_url: "https://www.hocheck.com/schneebericht",
    },
    Resort {
        id: "steinplatte",
        name: "Steinplatte-Winklmoosalm",
        latitude: 47.6772,
        longitude: 12.5983,
        snow_report_url: "https://www.steinplatte.tirol/en/snow-report",
    },
    Resort {
        id: "wilder-kaiser",
        name: "SkiWelt Wilder Kaiser-Brixental",
        latitude: 47.5110,
        longitude: 12.3050,
        snow_report_url: "https://www.skiwelt.at/en/snow-report",
    },
    Resort {
        id: "kitzbuehel",
        name: "Kitzbühel",
        latitude: 47.4264,
        longitude: 12.3929,
        snow_report_url: "https://www.kitzski.at/en/snow-report",
    },
    Resort {
        id: "mayrhofen",
        name: "Mayrhofen",
        latitude: 47.1670,
        longitude: 11.8664,
        snow_report_url: "https://www.mayrhofner-bergbahnen.com/en/snow-report",
    },
    Resort {
        id: "soelden",
        name: "Sölden",
        latitude: 46.9654,
        longitude: 11.0076,
        snow_report_url: "https://www.soelden.com/snow-report",
    },
    Resort {
        id: "ischgl",
        name: "Ischgl",
        latitude: 46.9906,
        longitude: 10.2882,
        snow_report_url: "https://www.ischgl.com/en/snow-report",
    },
    Resort {
        id: "st-anton",
        name: "St. Anton am Arlberg",
        latitude: 47.1275,
        longitude: 10.2618,
        snow_report_url: "https://www.stantonamarlberg.com/en/snow-report",
    },
    Resort {
        id: "oberstdorf-nebelhorn",
        name: "Oberstdorf Nebelhorn",
        latitude: 47.4094,
        longitude: 10.2793,
        snow_report_url: "https://www.ok-bergbahnen.com/schneebericht",
    },
];

/// Get a resort by its ID
///
/// # Arguments
///
/// * `id` - The unique identifier for the resort (e.g., "brauneck", "kitzbuehel")
///
/// # Returns
///
/// Returns `Some(&Resort)` if found, `None` otherwise
pub fn get_resort_by_id(id: &str) -> Option<&'static Resort> {
    RESORTS.iter().find(|resort| resort.id == id)
}

/// Get all supported resorts
///
/// # Returns
///
/// Returns a static slice containing all 14 supported ski resorts
pub fn all_resorts() -> &'static [Resort] {
    &RESORTS
}
