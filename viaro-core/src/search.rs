use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Smallest roster a booking may carry.
pub const MIN_PASSENGERS: u32 = 1;
/// Largest roster a booking may carry.
pub const MAX_PASSENGERS: u32 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TripType {
    OneWay,
    RoundTrip,
}

/// The journey parameters a traveler submits from the search form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchCriteria {
    pub origin_name: String,
    pub destination_name: String,
    pub departure_date: NaiveDate,
    pub return_date: Option<NaiveDate>, // only meaningful for round trips
    pub passenger_count: u32,
    pub trip_type: TripType,
}

impl SearchCriteria {
    pub fn one_way(
        origin_name: String,
        destination_name: String,
        departure_date: NaiveDate,
        passenger_count: u32,
    ) -> Self {
        Self {
            origin_name,
            destination_name,
            departure_date,
            return_date: None,
            passenger_count,
            trip_type: TripType::OneWay,
        }
    }

    /// Check the form as a whole; the first violation wins.
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.origin_name.trim().is_empty() {
            return Err(SearchError::OriginRequired);
        }
        if self.destination_name.trim().is_empty() {
            return Err(SearchError::DestinationRequired);
        }
        if self.origin_name.trim().eq_ignore_ascii_case(self.destination_name.trim()) {
            return Err(SearchError::IdenticalEndpoints);
        }
        if self.passenger_count < MIN_PASSENGERS || self.passenger_count > MAX_PASSENGERS {
            return Err(SearchError::PassengerCountOutOfRange {
                min: MIN_PASSENGERS,
                max: MAX_PASSENGERS,
            });
        }
        if self.trip_type == TripType::RoundTrip {
            match self.return_date {
                None => return Err(SearchError::ReturnDateRequired),
                Some(return_date) if return_date < self.departure_date => {
                    return Err(SearchError::ReturnBeforeDeparture);
                }
                Some(_) => {}
            }
        }
        Ok(())
    }
}

/// One entry in an autocomplete dropdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitySuggestion {
    pub id: String,
    pub name: String,
}

impl CitySuggestion {
    /// Derive a stable id from the display name ("New Delhi" -> "new-delhi").
    pub fn from_name(name: &str) -> Self {
        let id = name
            .to_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("-");
        Self {
            id,
            name: name.to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("Origin city is required")]
    OriginRequired,
    #[error("Destination city is required")]
    DestinationRequired,
    #[error("Origin and destination must be different cities")]
    IdenticalEndpoints,
    #[error("Passenger count must be between {min} and {max}")]
    PassengerCountOutOfRange { min: u32, max: u32 },
    #[error("Return date is required for a round trip")]
    ReturnDateRequired,
    #[error("Return date cannot be before the departure date")]
    ReturnBeforeDeparture,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn departure() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 14).unwrap()
    }

    #[test]
    fn test_one_way_criteria_validates() {
        let criteria =
            SearchCriteria::one_way("Delhi".to_string(), "Mumbai".to_string(), departure(), 2);
        assert!(criteria.validate().is_ok());
    }

    #[test]
    fn test_blank_origin_rejected() {
        let criteria =
            SearchCriteria::one_way("   ".to_string(), "Mumbai".to_string(), departure(), 2);
        assert!(matches!(
            criteria.validate(),
            Err(SearchError::OriginRequired)
        ));
    }

    #[test]
    fn test_identical_endpoints_rejected_case_insensitively() {
        let criteria =
            SearchCriteria::one_way("Delhi".to_string(), "DELHI".to_string(), departure(), 2);
        assert!(matches!(
            criteria.validate(),
            Err(SearchError::IdenticalEndpoints)
        ));
    }

    #[test]
    fn test_passenger_count_bounds() {
        let zero = SearchCriteria::one_way("Delhi".to_string(), "Mumbai".to_string(), departure(), 0);
        assert!(matches!(
            zero.validate(),
            Err(SearchError::PassengerCountOutOfRange { min: 1, max: 6 })
        ));

        let seven =
            SearchCriteria::one_way("Delhi".to_string(), "Mumbai".to_string(), departure(), 7);
        assert!(seven.validate().is_err());

        let six = SearchCriteria::one_way("Delhi".to_string(), "Mumbai".to_string(), departure(), 6);
        assert!(six.validate().is_ok());
    }

    #[test]
    fn test_round_trip_requires_return_date() {
        let mut criteria =
            SearchCriteria::one_way("Delhi".to_string(), "Mumbai".to_string(), departure(), 2);
        criteria.trip_type = TripType::RoundTrip;
        assert!(matches!(
            criteria.validate(),
            Err(SearchError::ReturnDateRequired)
        ));

        criteria.return_date = NaiveDate::from_ymd_opt(2025, 6, 10);
        assert!(matches!(
            criteria.validate(),
            Err(SearchError::ReturnBeforeDeparture)
        ));

        criteria.return_date = NaiveDate::from_ymd_opt(2025, 6, 20);
        assert!(criteria.validate().is_ok());
    }

    #[test]
    fn test_suggestion_id_is_slugged() {
        let suggestion = CitySuggestion::from_name("New Delhi");
        assert_eq!(suggestion.id, "new-delhi");
        assert_eq!(suggestion.name, "New Delhi");
    }
}
