use blocklog::{EventStore, EventView, FilterSet, describe_event, query_events};

pub(super) fn run_query(store: &EventStore, filters: &FilterSet, json: bool) -> Result<(), String> {
    let events = query_events(store, filters).map_err(|e| e.to_string())?;

    if json {
        let views: Vec<EventView<'_>> = events.iter().map(EventView::from).collect();
        let json_str = serde_json::to_string_pretty(&views).map_err(|e| e.to_string())?;
        println!("{}", json_str);
        return Ok(());
    }

    if events.is_empty() {
        println!("No matching events.");
        return Ok(());
    }
    for event in &events {
        println!("{}", describe_event(event));
    }
    Ok(())
}
