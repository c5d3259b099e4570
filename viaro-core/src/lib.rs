pub mod identity;
pub mod routes;
pub mod search;

pub use identity::{AuthSession, MockAuthSession, UserProfile};
pub use routes::{BusRoute, InMemoryRouteCatalog, RouteCatalog};
pub use search::{CitySuggestion, SearchCriteria, SearchError, TripType};
