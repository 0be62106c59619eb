//! Static rosters used across harnesses.

use super::builders::{advocate, AdvocateBuilder};
use advodir_core::NewAdvocate;

/// The two-advocate roster from the paging walkthrough: both share the last
/// name "Lee", only Bob lives in Austin.
pub fn lee_pair() -> Vec<NewAdvocate> {
    vec![
        advocate("Ann", "Lee", "Boston", "MD"),
        advocate("Bob", "Lee", "Austin", "MD"),
    ]
}

/// A realistic directory slice with mixed cities, degrees and casing.
pub fn directory() -> Vec<NewAdvocate> {
    vec![
        AdvocateBuilder::new("John", "Doe")
            .city("New York")
            .degree("MD")
            .specialty("Bipolar")
            .specialty("LGBTQ")
            .years(10)
            .phone(5551234567)
            .build(),
        AdvocateBuilder::new("Jane", "Smith")
            .city("Los Angeles")
            .degree("PhD")
            .specialty("Trauma & PTSD")
            .years(8)
            .phone(5559876543)
            .build(),
        AdvocateBuilder::new("Alice", "Johnson")
            .city("Chicago")
            .degree("MSW")
            .specialty("Personality disorders")
            .years(5)
            .phone(5554567890)
            .build(),
        AdvocateBuilder::new("Michael", "Brown")
            .city("Houston")
            .degree("MD")
            .years(12)
            .phone(5556543210)
            .build(),
        AdvocateBuilder::new("Emily", "Davis")
            .city("Phoenix")
            .degree("PhD")
            .specialty("Eating disorders")
            .years(7)
            .phone(5553216540)
            .build(),
        AdvocateBuilder::new("Chris", "Martinez")
            .city("Philadelphia")
            .degree("MSW")
            .years(9)
            .phone(5557890123)
            .build(),
        AdvocateBuilder::new("Jessica", "Taylor")
            .city("San Antonio")
            .degree("MD")
            .specialty("Domestic abuse")
            .years(11)
            .phone(5554561234)
            .build(),
        AdvocateBuilder::new("David", "SMITH")
            .city("San Diego")
            .degree("PhD")
            .years(6)
            .phone(5557896543)
            .build(),
        AdvocateBuilder::new("Laura", "Wilson")
            .city("Dallas")
            .degree("MSW")
            .years(4)
            .phone(5553214567)
            .build(),
        AdvocateBuilder::new("Daniel", "Smithers")
            .city("San Jose")
            .degree("MD")
            .years(13)
            .phone(5556548765)
            .build(),
    ]
}

/// Names carrying characters that are wildcards in SQL `LIKE`, FTS5 query
/// syntax, or glob patterns.
pub fn wildcard_roster() -> Vec<NewAdvocate> {
    vec![
        advocate("Ann", "Lee", "Boston", "MD"),
        advocate("Per%cent", "Lee", "Boston", "MD"),
        advocate("Under_score", "Lee", "Boston", "MD"),
        advocate("Star*", "Lee", "Boston", "MD"),
        advocate("Back\\slash", "Lee", "Boston", "MD"),
        advocate("Quote\"d", "Lee", "Boston", "MD"),
        advocate("Émile", "Zoë", "Montréal", "MD"),
    ]
}

/// A roster file in the import format, as written by hand.
pub const ROSTER_JSON: &str = r#"[
  {"firstName":"Ann","lastName":"Lee","city":"Boston","degree":"MD","specialties":["Bipolar"],"yearsOfExperience":9,"phoneNumber":5551110000},
  {"firstName":"Bob","lastName":"Lee","city":"Austin","degree":"MD","yearsOfExperience":2,"phoneNumber":5552220000},
  {"firstName":"Cara","lastName":"Diaz","city":"El Paso","degree":"PhD","specialties":[],"yearsOfExperience":15,"phoneNumber":5553330000}
]"#;
