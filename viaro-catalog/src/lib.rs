pub mod debounce;
pub mod resolver;

pub use debounce::Debouncer;
pub use resolver::{AutocompleteView, CityResolver, ResolverConfig, SearchField};
