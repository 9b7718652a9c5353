//! Civic code reference data.
//!
//! The bundled `city-code.csv` has three columns: civic code, prefecture and
//! municipality. It backs the two-stage prefecture / municipality selector whose
//! final choice feeds [`RegionCode::from_civic_code`](crate::region::RegionCode::from_civic_code).

use serde::Deserialize;

/// One municipality row.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct City {
    pub civic_code: String,
    pub prefecture: String,
    pub municipality: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CityDirectory {
    cities: Vec<City>,
}

impl CityDirectory {
    /// Parse CSV text. A header row (first field not numeric), blank lines and rows
    /// with fewer than three fields are skipped.
    pub fn from_csv(text: &str) -> Self {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());

        let cities = reader
            .deserialize::<City>()
            .filter_map(|row| match row {
                Ok(city) => Some(city),
                Err(e) => {
                    tracing::debug!("Skipping city row: {}", e);
                    None
                }
            })
            .filter(|city| is_civic_code(&city.civic_code))
            .collect();

        Self { cities }
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }

    /// Prefectures in first-appearance order, without duplicates.
    pub fn prefectures(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for city in &self.cities {
            if !seen.contains(&city.prefecture.as_str()) {
                seen.push(&city.prefecture);
            }
        }
        seen
    }

    pub fn municipalities<'a>(&'a self, prefecture: &'a str) -> impl Iterator<Item = &'a City> + 'a {
        self.cities.iter().filter(move |city| city.prefecture == prefecture)
    }

    pub fn find(&self, civic_code: &str) -> Option<&City> {
        self.cities.iter().find(|city| city.civic_code == civic_code)
    }
}

fn is_civic_code(code: &str) -> bool {
    code.starts_with(|c: char| c.is_ascii_digit()) && code.chars().all(|c| c.is_ascii_alphanumeric())
}
