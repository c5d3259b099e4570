use anyhow::anyhow;
use chrono::{Days, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use viaro_booking::ledger::{BookingLedger, InMemoryBookingLedger};
use viaro_booking::models::{BookingStage, Gender};
use viaro_booking::roster::PassengerField;
use viaro_booking::workflow::BookingWorkflow;
use viaro_catalog::resolver::{CityResolver, SearchField};
use viaro_core::identity::{AuthSession, MockAuthSession};
use viaro_core::routes::InMemoryRouteCatalog;
use viaro_core::search::{SearchCriteria, TripType};
use viaro_offer::synthetic::SyntheticOfferingProvider;

mod config;

/// Scripted walk through the whole booking flow against in-memory
/// collaborators: autocomplete, search, roster, seats, summary, one failed
/// submission, the retry, and finally the ledger view.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let app_config = config::AppConfig::load()?;

    // Demo wiring: every collaborator is the in-memory flavor.
    let catalog = Arc::new(InMemoryRouteCatalog::seeded());
    let auth = Arc::new(MockAuthSession::anonymous());
    let ledger = Arc::new(InMemoryBookingLedger::new());
    let provider = Arc::new(SyntheticOfferingProvider::with_config(
        app_config.offerings.clone(),
    ));
    let resolver = CityResolver::new(catalog, app_config.search.clone());
    let mut workflow = BookingWorkflow::new(
        auth.clone(),
        provider,
        ledger.clone(),
        app_config.fare.clone(),
    );

    // Type into both city fields and wait out the debounce window.
    resolver.note_input(SearchField::Origin, "de");
    resolver.note_input(SearchField::Origin, "del");
    resolver.note_input(SearchField::Destination, "jai");
    tokio::time::sleep(Duration::from_millis(app_config.search.debounce_ms + 100)).await;

    let origin_view = resolver.view(SearchField::Origin);
    info!(
        "Origin suggestions for '{}': {:?}",
        origin_view.query,
        origin_view
            .suggestions
            .iter()
            .map(|suggestion| suggestion.name.as_str())
            .collect::<Vec<_>>()
    );
    let origin_pick = origin_view
        .suggestions
        .first()
        .ok_or_else(|| anyhow!("no origin suggestions"))?;
    let origin = resolver
        .pick_suggestion(SearchField::Origin, &origin_pick.id)
        .ok_or_else(|| anyhow!("origin suggestion vanished"))?;

    let destination_view = resolver.view(SearchField::Destination);
    let destination_pick = destination_view
        .suggestions
        .first()
        .ok_or_else(|| anyhow!("no destination suggestions"))?;
    let destination = resolver
        .pick_suggestion(SearchField::Destination, &destination_pick.id)
        .ok_or_else(|| anyhow!("destination suggestion vanished"))?;

    let criteria = SearchCriteria {
        origin_name: origin.name,
        destination_name: destination.name,
        departure_date: Utc::now().date_naive() + Days::new(7),
        return_date: None,
        passenger_count: 3,
        trip_type: TripType::OneWay,
    };

    // First attempt without a session: refused and routed to login.
    if let Err(err) = workflow.begin_search(criteria.clone()).await {
        warn!("Search refused: {}", err);
    }
    auth.login("asha");
    workflow.begin_search(criteria).await?;

    let chosen = {
        let mut by_price: Vec<_> = workflow.offerings().iter().collect();
        by_price.sort_by_key(|offering| offering.unit_price);
        for offering in by_price.iter().take(3) {
            info!(
                "  {} dep {} ({}) fare {} [{} seats left]",
                offering.label(),
                offering.departure_time.format("%H:%M"),
                offering.duration_label,
                offering.unit_price,
                offering.available_seat_count
            );
        }
        by_price
            .first()
            .map(|offering| offering.id)
            .ok_or_else(|| anyhow!("no offerings returned"))?
    };
    workflow.select_offering(chosen)?;

    let travelers = [
        ("Asha Rao", 34, Gender::Female),
        ("Vikram Rao", 36, Gender::Male),
        ("Meera Rao", 9, Gender::Female),
    ];
    for (index, (name, age, gender)) in travelers.into_iter().enumerate() {
        workflow.update_passenger(index, PassengerField::Name(name.to_string()))?;
        workflow.update_passenger(index, PassengerField::Age(Some(age)))?;
        workflow.update_passenger(index, PassengerField::Gender(Some(gender)))?;
    }
    workflow.update_passenger(0, PassengerField::Email(Some("asha@example.com".to_string())))?;
    workflow.update_passenger(0, PassengerField::Phone(Some("+91 98100 11223".to_string())))?;
    workflow.proceed_to_seats()?;

    // Grab the lowest-numbered free seats until every traveler has one.
    let mut seat = 1;
    while !workflow
        .seat_map()
        .map(|map| map.selection_complete())
        .unwrap_or(true)
    {
        workflow.toggle_seat(seat)?;
        seat += 1;
    }
    if let Some(map) = workflow.seat_map() {
        info!("Seats picked: {:?}", map.selected());
    }

    workflow.proceed_to_summary()?;
    if let Some(breakdown) = workflow.fare_breakdown() {
        info!(
            "Fare: {} base + {} tax + {} service charge = {}",
            breakdown.base, breakdown.tax, breakdown.service_charge, breakdown.total
        );
    }

    // One simulated ledger outage, then the retry goes through.
    ledger.fail_next_submission();
    if let Err(err) = workflow.submit().await {
        warn!("First submission attempt failed: {}", err);
        for notice in workflow.take_notices(BookingStage::Summary) {
            warn!("  notice: {}", notice);
        }
    }
    let confirmation = workflow.submit().await?;
    info!(
        "Booking confirmed: {} (total {})",
        confirmation.booking_reference, confirmation.total_amount
    );

    if let Some(user) = auth.current_user() {
        let bookings = ledger.list_bookings(user.id).await?;
        for entry in &bookings {
            info!(
                "Ledger entry: {} {} seats {:?} total {} [{:?}]",
                entry.booking_reference,
                entry.operator_name,
                entry.seats,
                entry.total_amount,
                entry.status
            );
        }
        if let Some(entry) = bookings.first() {
            ledger.cancel_booking(&entry.booking_reference).await?;
            info!("Cancelled {}", entry.booking_reference);
        }
    }

    Ok(())
}
