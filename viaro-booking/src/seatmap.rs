use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::collections::BTreeSet;
use viaro_offer::models::Offering;

/// Every coach in the fleet has the same layout.
pub const TOTAL_SEATS: i32 = 40;

/// What a successful toggle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeatToggle {
    Selected,
    Deselected,
    /// The seat is pre-sold; taps on it are ignored rather than rejected.
    IgnoredBooked,
}

/// Seat occupancy and the traveler's picks for one offering, valid for the
/// lifetime of the booking session.
#[derive(Debug, Clone, Serialize)]
pub struct SeatMap {
    total_seats: i32,
    booked: BTreeSet<i32>,
    /// Picks in tap order, never overlapping `booked`.
    selected: Vec<i32>,
    capacity: usize,
}

impl SeatMap {
    /// Build the map for a chosen offering. Occupancy is drawn from a rng
    /// seeded with the offering id, so re-entering the stage shows the same
    /// booked seats for as long as the offering lives.
    pub fn for_offering(offering: &Offering, capacity: usize) -> Self {
        let booked_count = (TOTAL_SEATS - offering.available_seat_count).clamp(0, TOTAL_SEATS);
        let (seed, _) = offering.id.as_u64_pair();
        let mut rng = StdRng::seed_from_u64(seed);
        let mut booked = BTreeSet::new();
        while (booked.len() as i32) < booked_count {
            booked.insert(rng.gen_range(1..=TOTAL_SEATS));
        }
        Self {
            total_seats: TOTAL_SEATS,
            booked,
            selected: Vec::new(),
            capacity,
        }
    }

    /// Direct construction for callers that already know the occupancy.
    pub fn with_booked(booked: BTreeSet<i32>, capacity: usize) -> Self {
        Self {
            total_seats: TOTAL_SEATS,
            booked,
            selected: Vec::new(),
            capacity,
        }
    }

    /// Flip one seat. Booked seats report `IgnoredBooked`; a pick past the
    /// roster size is an error the UI surfaces as a notice.
    pub fn toggle(&mut self, seat: i32) -> Result<SeatToggle, SeatMapError> {
        if seat < 1 || seat > self.total_seats {
            return Err(SeatMapError::OutOfRange {
                seat,
                total: self.total_seats,
            });
        }
        if self.booked.contains(&seat) {
            return Ok(SeatToggle::IgnoredBooked);
        }
        if let Some(position) = self.selected.iter().position(|&picked| picked == seat) {
            self.selected.remove(position);
            return Ok(SeatToggle::Deselected);
        }
        if self.selected.len() >= self.capacity {
            return Err(SeatMapError::SelectionLimitReached {
                required: self.capacity,
            });
        }
        self.selected.push(seat);
        Ok(SeatToggle::Selected)
    }

    /// Follow the roster size. Shrinking drops the newest picks first.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
        if self.selected.len() > capacity {
            self.selected.truncate(capacity);
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn total_seats(&self) -> i32 {
        self.total_seats
    }

    pub fn booked(&self) -> &BTreeSet<i32> {
        &self.booked
    }

    pub fn selected(&self) -> &[i32] {
        &self.selected
    }

    pub fn is_selected(&self, seat: i32) -> bool {
        self.selected.contains(&seat)
    }

    pub fn selection_complete(&self) -> bool {
        self.selected.len() == self.capacity
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SeatMapError {
    #[error("Seat {seat} is outside the 1..={total} layout")]
    OutOfRange { seat: i32, total: i32 },

    #[error("Selection limit reached: this booking needs exactly {required} seat(s)")]
    SelectionLimitReached { required: usize },
}
