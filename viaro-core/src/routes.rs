use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One serviced city pair in the operator network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusRoute {
    pub source: String,
    pub destination: String,
}

impl BusRoute {
    pub fn new(source: &str, destination: &str) -> Self {
        Self {
            source: source.to_string(),
            destination: destination.to_string(),
        }
    }
}

/// Read side of the route network. Autocomplete is the only consumer; it
/// derives city names from the pairs rather than asking for cities directly.
#[async_trait]
pub trait RouteCatalog: Send + Sync {
    async fn list_routes(&self) -> Result<Vec<BusRoute>, Box<dyn std::error::Error + Send + Sync>>;
}

/// Catalog backed by a fixed list, used by the demo wiring and tests.
pub struct InMemoryRouteCatalog {
    routes: Vec<BusRoute>,
}

impl InMemoryRouteCatalog {
    pub fn new(routes: Vec<BusRoute>) -> Self {
        Self { routes }
    }

    /// A small network of popular Indian intercity routes.
    pub fn seeded() -> Self {
        Self::new(vec![
            BusRoute::new("New Delhi", "Jaipur"),
            BusRoute::new("New Delhi", "Chandigarh"),
            BusRoute::new("Mumbai", "Pune"),
            BusRoute::new("Mumbai", "Goa"),
            BusRoute::new("Bangalore", "Chennai"),
            BusRoute::new("Bangalore", "Hyderabad"),
            BusRoute::new("Hyderabad", "Vijayawada"),
            BusRoute::new("Pune", "Nagpur"),
            BusRoute::new("Chennai", "Coimbatore"),
            BusRoute::new("Ahmedabad", "Mumbai"),
            BusRoute::new("Lucknow", "New Delhi"),
            BusRoute::new("Kolkata", "Bhubaneswar"),
        ])
    }
}

#[async_trait]
impl RouteCatalog for InMemoryRouteCatalog {
    async fn list_routes(&self) -> Result<Vec<BusRoute>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.routes.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_catalog_returns_seeded_routes() {
        let catalog = InMemoryRouteCatalog::seeded();
        let routes = catalog.list_routes().await.unwrap();
        assert!(!routes.is_empty());
        assert!(routes.contains(&BusRoute::new("Mumbai", "Pune")));
    }
}
