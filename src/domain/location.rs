use std::fmt;

use thiserror::Error;

pub const MAX_LOCATION_LENGTH: usize = 256;

/// Identifier of a place, used both as cache key and as upstream request input
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocationKey(String);

#[derive(Error, Debug, PartialEq, Eq)]
pub enum LocationKeyError {
    #[error("location is empty")]
    Empty,
    #[error("location is longer than {MAX_LOCATION_LENGTH} bytes")]
    TooLong,
}

impl LocationKey {
    /// Surrounding whitespace is dropped, everything else is kept as is
    pub fn parse(input: &str) -> Result<Self, LocationKeyError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(LocationKeyError::Empty);
        }
        if trimmed.len() > MAX_LOCATION_LENGTH {
            return Err(LocationKeyError::TooLong);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for LocationKey {
    type Error = LocationKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl TryFrom<&str> for LocationKey {
    type Error = LocationKeyError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl fmt::Display for LocationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn allowed_locations() {
        let locations = [
            "Berlin",
            "Berlin, Germany",
            "  Berlin  ",
            "52.52,13.40",
            "São Paulo",
            "x",
        ];
        for location in locations {
            let result = LocationKey::parse(location);
            assert!(
                result.is_ok(),
                "{} should be allowed, instead: {:?}",
                location,
                result
            );
        }
    }

    #[test]
    fn disallowed_locations() {
        let too_long = "a".repeat(MAX_LOCATION_LENGTH + 1);
        let locations = ["", " ", "\t\n", too_long.as_str()];
        for location in locations {
            let result = LocationKey::parse(location);
            assert!(
                result.is_err(),
                "{} should not be allowed, instead: {:?}",
                location,
                result
            );
        }
    }

    #[test]
    fn keeps_case_and_inner_spacing() {
        let key = LocationKey::parse("  new   York ").unwrap();
        assert_eq!(key.as_str(), "new   York");
    }
}
