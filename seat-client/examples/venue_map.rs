// seat-client/examples/venue_map.rs
// Load a venue, follow its availability and print the map statuses

use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveTime};
use seat_client::ClientConfig;
use seat_engine::{
    AvailabilitySyncEngine, EngineConfig, SuggestionSearchEngine, VenueLayout, ViewportController,
    init_logging,
};
use shared::models::AvailabilityQuery;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = EngineConfig::load(std::path::Path::new("seat-engine.json"))?;
    let _guard = init_logging(&config.logging)?;

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        println!("Usage: {} <base_url> <venue_id> [party_size] [HH:MM]", args[0]);
        println!("  Example: {} http://localhost:8000 r1 2 19:30", args[0]);
        return Ok(());
    }
    let party_size: u32 = args.get(3).and_then(|p| p.parse().ok()).unwrap_or(2);
    let time = args
        .get(4)
        .and_then(|t| NaiveTime::parse_from_str(t, "%H:%M").ok());

    let mut client_config = ClientConfig::new(&args[1]);
    if let Ok(token) = std::env::var("SEAT_TOKEN") {
        client_config = client_config.with_token(token);
    }
    let client = Arc::new(client_config.build_http_client()?);
    let venue_id = &args[2];

    let floorplan = client.fetch_floorplan(venue_id).await?;
    let mut layout = VenueLayout::from_floorplan(&floorplan);
    let mut viewport =
        ViewportController::new(config.viewport.clone(), floorplan.canvas.width, floorplan.canvas.height);
    tracing::info!(areas = layout.areas().len(), "Floorplan loaded");

    let sync = Arc::new(AvailabilitySyncEngine::new(client.clone(), config.sync.clone()));
    let mut query = AvailabilityQuery::new(venue_id.as_str(), Local::now().date_naive(), party_size);
    query.time = time;
    sync.start(query);

    let mut states = sync.subscribe();
    states
        .wait_for(|s| s.snapshot.last_synced_at.is_some() || s.snapshot.sync_error.is_some())
        .await?;
    let snapshot = sync.snapshot();
    if let Some(error) = &snapshot.sync_error {
        tracing::warn!(%error, "Showing map without availability");
    }
    layout.apply_availability(&snapshot);

    for area in layout.areas() {
        println!("== {} ({})", area.name, area.id);
        for view in layout.statuses(&area.id)? {
            let p = view.table.position.unwrap_or_default();
            println!(
                "  {:<8} seats {:<2} at ({:>5.1}, {:>5.1})  {:?}",
                view.table.name, view.table.capacity, p.x, p.y, view.status
            );
        }
    }

    // Pick the first bookable table and zoom the map onto it
    let first_free = layout
        .areas()
        .iter()
        .flat_map(|a| a.tables.iter())
        .find(|t| layout.get_status(&t.id).is_bookable() && t.seats(party_size))
        .map(|t| t.id.clone());
    if let Some(id) = first_free {
        layout.select_table(&id)?;
        if let Some(region) = layout.bounds_of(&id) {
            viewport.focus_on(region.to_canvas(floorplan.canvas.width, floorplan.canvas.height));
            while viewport.tick(Duration::from_millis(16)) {}
        }
        println!("Selected {} -> {:?}", id, viewport.current_transform());
    }

    if let Ok(reservation_id) = std::env::var("SEAT_RESERVATION") {
        let search = Arc::new(SuggestionSearchEngine::new(
            client.clone(),
            reservation_id,
            config.search.clone(),
        ));
        search.query("airport");
        tokio::time::sleep(config.search.debounce + Duration::from_secs(2)).await;
        for place in search.state().results {
            println!("  -> {} ({:?} min)", place.label(), place.eta_minutes);
        }
    }

    sync.stop();
    Ok(())
}
