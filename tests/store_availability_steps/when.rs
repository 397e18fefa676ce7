//! When steps for store availability BDD scenarios.

use super::world::{AvailabilityWorld, run_async};
use rstest_bdd_macros::when;

#[when(r#"player "{player}" submits "{text}""#)]
fn player_submits(
    world: &mut AvailabilityWorld,
    player: String,
    text: String,
) -> Result<(), eyre::Report> {
    let stored = run_async(world.harness()?.service.submit_message(&player, &text));
    world.last_submission = Some(stored);
    Ok(())
}

#[when("the message store becomes reachable")]
fn store_becomes_reachable(world: &mut AvailabilityWorld) -> Result<(), eyre::Report> {
    world.harness()?.connector.set_reachable(true);
    Ok(())
}
