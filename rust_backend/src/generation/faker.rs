//! Seeded fake data for anonymized bus stops and line codes.

use rand::seq::SliceRandom;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use std::collections::HashSet;

use super::error::{GenerationError, GenerationResult};
use super::rng::seeded_rng;

/// Attempts made before a unique value is considered exhausted.
const MAX_UNIQUE_ATTEMPTS: usize = 1_000;

const STREET_NAMES: &[&str] = &[
    "Adams", "Baker", "Cedar", "Chestnut", "Clark", "Dogwood", "Elm", "Franklin", "Garfield",
    "Grant", "Hamilton", "Hickory", "Jackson", "Jefferson", "Lake", "Lincoln", "Madison",
    "Maple", "Meadow", "Mill", "Monroe", "Oak", "Park", "Pine", "Ridge", "River", "Spruce",
    "Sunset", "Taylor", "Walnut", "Washington", "Willow",
];

const STREET_SUFFIXES: &[&str] = &[
    "Avenue", "Boulevard", "Court", "Drive", "Lane", "Parkway", "Place", "Road", "Square",
    "Street", "Terrace", "Way",
];

const SECONDARY_UNITS: &[&str] = &["Apt.", "Suite"];

const CITY_PREFIXES: &[&str] = &["East", "Lake", "New", "North", "Port", "South", "West"];

const CITY_SUFFIXES: &[&str] = &[
    "berg", "borough", "bury", "chester", "fort", "haven", "land", "mouth", "port", "side",
    "stad", "ton", "town", "view", "ville",
];

/// Deterministic fake-data source.
///
/// Values requested through the `unique_*` methods never repeat for the
/// lifetime of the generator.
pub struct FakeData {
    rng: ChaCha8Rng,
    used_addresses: HashSet<String>,
    used_line_codes: HashSet<String>,
}

impl FakeData {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: seeded_rng(seed),
            used_addresses: HashSet::new(),
            used_line_codes: HashSet::new(),
        }
    }

    /// Fair coin.
    pub fn boolean(&mut self) -> bool {
        self.rng.gen_bool(0.5)
    }

    /// Replace `?` with a random ASCII letter and `#` with a random digit.
    pub fn bothify(&mut self, pattern: &str) -> String {
        pattern
            .chars()
            .map(|c| match c {
                '?' => {
                    let letter = self.rng.gen_range(0..26u8);
                    if self.rng.gen_bool(0.5) {
                        (b'a' + letter) as char
                    } else {
                        (b'A' + letter) as char
                    }
                }
                '#' => char::from_digit(self.rng.gen_range(0..10), 10).unwrap_or('0'),
                other => other,
            })
            .collect()
    }

    /// Upper-cased `?-###` line code, unique within this generator.
    pub fn unique_line_code(&mut self) -> GenerationResult<String> {
        for _ in 0..MAX_UNIQUE_ATTEMPTS {
            let code = self.bothify("?-###").to_uppercase();
            if self.used_line_codes.insert(code.clone()) {
                return Ok(code);
            }
        }
        Err(GenerationError::UniquenessExhausted {
            what: "line code",
            attempts: MAX_UNIQUE_ATTEMPTS,
        })
    }

    /// Building number, street name and suffix, sometimes with a secondary unit.
    pub fn street_address(&mut self) -> String {
        let building = self.rng.gen_range(1..=9_999);
        let street = self.pick(STREET_NAMES);
        let suffix = self.pick(STREET_SUFFIXES);
        let mut address = format!("{} {} {}", building, street, suffix);

        if self.rng.gen_bool(0.3) {
            let unit = self.pick(SECONDARY_UNITS);
            address.push_str(&format!(" {} {}", unit, self.rng.gen_range(100..1_000)));
        }
        address
    }

    pub fn city(&mut self) -> String {
        let name = self.pick(STREET_NAMES);
        let suffix = self.pick(CITY_SUFFIXES);
        if self.rng.gen_bool(0.5) {
            let prefix = self.pick(CITY_PREFIXES);
            format!("{} {}{}", prefix, name, suffix)
        } else {
            format!("{}{}", name, suffix)
        }
    }

    /// `"<street address>, <city>"`, unique within this generator.
    pub fn unique_address(&mut self) -> GenerationResult<String> {
        for _ in 0..MAX_UNIQUE_ATTEMPTS {
            let address = format!("{}, {}", self.street_address(), self.city());
            if self.used_addresses.insert(address.clone()) {
                return Ok(address);
            }
        }
        Err(GenerationError::UniquenessExhausted {
            what: "address",
            attempts: MAX_UNIQUE_ATTEMPTS,
        })
    }

    fn pick(&mut self, options: &[&'static str]) -> &'static str {
        options.choose(&mut self.rng).copied().unwrap_or_default()
    }
}
