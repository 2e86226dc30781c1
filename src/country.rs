// src/country.rs
//! Country lookups shared by the location service and the editor

use crate::types::profile::CountryRef;
use crate::types::reference::{Country, LocationInfo};

pub fn find_country_by_code<'a>(countries: &'a [Country], code: &str) -> Option<&'a Country> {
    if code.is_empty() {
        return None;
    }
    countries
        .iter()
        .find(|country| !country.country_code.is_empty() && country.country_code.eq_ignore_ascii_case(code))
}

/// Build a country entry from an IP lookup; needs at least a country code
pub fn country_from_location(location: &LocationInfo) -> Option<Country> {
    let code = location.country_code.as_deref().filter(|c| !c.is_empty())?;

    Some(Country {
        country_code: code.to_string(),
        country_name: location
            .country
            .clone()
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| code.to_string()),
        region: location.region.clone(),
        city: location.city.clone(),
        timezone: location.timezone.clone(),
        zones: Vec::new(),
    })
}

pub fn country_code(country: &CountryRef) -> Option<&str> {
    let code = match country {
        CountryRef::Text(text) => text.as_str(),
        CountryRef::Record(record) => record.country_code.as_str(),
    };
    (!code.is_empty()).then_some(code)
}

pub fn country_name(country: &CountryRef) -> Option<&str> {
    let name = match country {
        CountryRef::Text(text) => text.as_str(),
        CountryRef::Record(record) => record.country_name.as_str(),
    };
    (!name.is_empty()).then_some(name)
}

/// Same country when both codes are present and match case-insensitively
pub fn countries_equal(a: &CountryRef, b: &CountryRef) -> bool {
    match (country_code(a), country_code(b)) {
        (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
        _ => false,
    }
}

pub fn is_valid_country_code(code: &str) -> bool {
    let code = code.trim();
    code.len() == 2 && code.chars().all(|c| c.is_ascii_alphabetic())
}

/// Prefer the entry from the known country list, else build one from the location
pub fn convert_location_to_country(location: &LocationInfo, available: &[Country]) -> Option<Country> {
    let code = location.country_code.as_deref().filter(|c| !c.is_empty())?;

    find_country_by_code(available, code)
        .cloned()
        .or_else(|| country_from_location(location))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn morocco() -> Country {
        Country {
            country_code: "MA".to_string(),
            country_name: "Morocco".to_string(),
            timezone: Some("Africa/Casablanca".to_string()),
            ..Country::default()
        }
    }

    fn location(code: Option<&str>, name: Option<&str>) -> LocationInfo {
        LocationInfo {
            country_code: code.map(String::from),
            country: name.map(String::from),
            city: Some("Rabat".to_string()),
            ..LocationInfo::default()
        }
    }

    #[test]
    fn test_find_country_by_code_ignores_case() {
        let countries = vec![morocco()];
        assert_eq!(find_country_by_code(&countries, "ma"), Some(&countries[0]));
        assert_eq!(find_country_by_code(&countries, "FR"), None);
        assert_eq!(find_country_by_code(&countries, ""), None);
    }

    #[test]
    fn test_country_from_location() {
        let built = country_from_location(&location(Some("FR"), None)).unwrap();
        assert_eq!(built.country_name, "FR");
        assert_eq!(built.city.as_deref(), Some("Rabat"));
        assert!(country_from_location(&location(None, Some("France"))).is_none());
    }

    #[test]
    fn test_countries_equal_and_accessors() {
        let text = CountryRef::Text("ma".to_string());
        let record = CountryRef::Record(morocco());

        assert!(countries_equal(&text, &record));
        assert!(!countries_equal(&text, &CountryRef::Text(String::new())));
        assert_eq!(country_code(&record), Some("MA"));
        assert_eq!(country_name(&record), Some("Morocco"));
        assert_eq!(country_name(&text), Some("ma"));
        assert_eq!(country_code(&CountryRef::default()), None);
    }

    #[test]
    fn test_is_valid_country_code() {
        assert!(is_valid_country_code("ma"));
        assert!(is_valid_country_code(" US "));
        assert!(!is_valid_country_code("USA"));
        assert!(!is_valid_country_code("1A"));
    }

    #[test]
    fn test_convert_location_prefers_known_country() {
        let available = vec![morocco()];

        let known = convert_location_to_country(&location(Some("ma"), Some("Maroc")), &available);
        assert_eq!(known, Some(morocco()));

        let built = convert_location_to_country(&location(Some("ES"), Some("Spain")), &available)
            .unwrap();
        assert_eq!(built.country_name, "Spain");

        assert!(convert_location_to_country(&location(None, None), &available).is_none());
    }
}
