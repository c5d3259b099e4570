use crate::models::{Gender, PassengerRecord};
use serde::Serialize;
use viaro_core::search::{MAX_PASSENGERS, MIN_PASSENGERS};

/// Youngest traveler a booking may carry.
pub const MIN_AGE: u8 = 5;
/// Oldest traveler a booking may carry.
pub const MAX_AGE: u8 = 100;

/// One typed edit to a roster entry.
#[derive(Debug, Clone)]
pub enum PassengerField {
    Name(String),
    Age(Option<u8>),
    Gender(Option<Gender>),
    Email(Option<String>),
    Phone(Option<String>),
}

/// Ordered list of travelers. Its length is the number of seats the booking
/// must end up with, so every growth or shrink flows through here.
#[derive(Debug, Clone, Serialize)]
pub struct PassengerRoster {
    passengers: Vec<PassengerRecord>,
}

impl PassengerRoster {
    /// `count` blank records, clamped into the allowed roster bounds.
    pub fn blank(count: usize) -> Self {
        let count = count.clamp(MIN_PASSENGERS as usize, MAX_PASSENGERS as usize);
        Self {
            passengers: vec![PassengerRecord::default(); count],
        }
    }

    pub fn len(&self) -> usize {
        self.passengers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passengers.is_empty()
    }

    pub fn passengers(&self) -> &[PassengerRecord] {
        &self.passengers
    }

    /// Append a blank record. Returns false at the upper bound.
    pub fn add_passenger(&mut self) -> bool {
        if self.passengers.len() >= MAX_PASSENGERS as usize {
            return false;
        }
        self.passengers.push(PassengerRecord::default());
        true
    }

    /// Remove the record at `index`. The last remaining traveler stays put,
    /// and an out-of-bounds index is a no-op.
    pub fn remove_passenger(&mut self, index: usize) -> bool {
        if self.passengers.len() <= MIN_PASSENGERS as usize || index >= self.passengers.len() {
            return false;
        }
        self.passengers.remove(index);
        true
    }

    pub fn update_field(&mut self, index: usize, field: PassengerField) -> Result<(), RosterError> {
        let record = self
            .passengers
            .get_mut(index)
            .ok_or(RosterError::NoSuchPassenger { index })?;
        match field {
            PassengerField::Name(name) => record.name = name,
            PassengerField::Age(age) => record.age = age,
            PassengerField::Gender(gender) => record.gender = gender,
            PassengerField::Email(email) => record.email = email,
            PassengerField::Phone(phone) => record.phone = phone,
        }
        Ok(())
    }

    /// Stage-advance validation; the first failing record wins. Email and
    /// phone stay optional.
    pub fn validate(&self) -> Result<(), RosterError> {
        for (index, record) in self.passengers.iter().enumerate() {
            if record.name.trim().is_empty() {
                return Err(RosterError::Invalid {
                    index,
                    rule: FieldRule::NameRequired,
                });
            }
            match record.age {
                None => {
                    return Err(RosterError::Invalid {
                        index,
                        rule: FieldRule::AgeRequired,
                    })
                }
                Some(age) if !(MIN_AGE..=MAX_AGE).contains(&age) => {
                    return Err(RosterError::Invalid {
                        index,
                        rule: FieldRule::AgeOutOfRange {
                            min: MIN_AGE,
                            max: MAX_AGE,
                        },
                    })
                }
                Some(_) => {}
            }
            if record.gender.is_none() {
                return Err(RosterError::Invalid {
                    index,
                    rule: FieldRule::GenderRequired,
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    #[error("Passenger {index}: {rule}")]
    Invalid { index: usize, rule: FieldRule },

    #[error("No passenger at index {index}")]
    NoSuchPassenger { index: usize },
}

#[derive(Debug, thiserror::Error)]
pub enum FieldRule {
    #[error("name must not be blank")]
    NameRequired,

    #[error("age is required")]
    AgeRequired,

    #[error("age must be between {min} and {max}")]
    AgeOutOfRange { min: u8, max: u8 },

    #[error("gender must be selected")]
    GenderRequired,
}
