use blocklog::{ConfigStore, EventStore, TeleportOutcome, TeleportRequest, teleport};

pub(super) fn run_teleport(
    values: &[i64],
    config: &mut ConfigStore,
    store: &EventStore,
) -> Result<(), String> {
    let request = TeleportRequest::from_values(values).map_err(|e| e.to_string())?;
    let outcome = teleport(request, config, store).map_err(|e| e.to_string())?;

    match outcome {
        TeleportOutcome::Current(coords) => {
            let world = coords
                .world_id
                .map(|id| id.to_string())
                .unwrap_or_else(|| "unknown".into());
            println!("Current position: {} in world {}", coords, world);
        }
        TeleportOutcome::Applied {
            world_name,
            coords,
            save_error,
        } => {
            println!("Teleported to world {} at {}.", world_name, coords);
            if let Some(err) = save_error {
                eprintln!("warning: position not saved: {}", err);
            }
        }
        TeleportOutcome::Rejected { world_id: Some(id) } => {
            println!("World {} not found; position unchanged.", id);
        }
        TeleportOutcome::Rejected { world_id: None } => {
            println!("No world known to teleport into; position unchanged.");
        }
    }

    Ok(())
}
