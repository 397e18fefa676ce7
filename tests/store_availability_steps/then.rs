//! Then steps for store availability BDD scenarios.

use super::world::{AvailabilityWorld, run_async};
use craftmessage::message::domain::PlayerId;
use craftmessage::store::StoreState;
use eyre::WrapErr;
use rstest_bdd_macros::then;

fn expect_submission(world: &AvailabilityWorld, expected: bool) -> Result<(), eyre::Report> {
    let stored = world
        .last_submission
        .ok_or_else(|| eyre::eyre!("no submission recorded in scenario world"))?;
    if stored != expected {
        return Err(eyre::eyre!(
            "expected submission stored = {expected}, got {stored}"
        ));
    }
    Ok(())
}

#[then("the submission is stored")]
fn submission_stored(world: &AvailabilityWorld) -> Result<(), eyre::Report> {
    expect_submission(world, true)
}

#[then("the submission is not stored")]
fn submission_not_stored(world: &AvailabilityWorld) -> Result<(), eyre::Report> {
    expect_submission(world, false)
}

#[then("listing all messages returns {count:usize} entries")]
fn list_all_returns(world: &AvailabilityWorld, count: usize) -> Result<(), eyre::Report> {
    let listed = run_async(world.harness()?.service.list_all());
    if listed.len() != count {
        return Err(eyre::eyre!(
            "expected {count} messages, found {}",
            listed.len()
        ));
    }
    Ok(())
}

#[then(r#"the newest message of player "{player}" is "{text}""#)]
fn newest_message_is(
    world: &AvailabilityWorld,
    player: String,
    text: String,
) -> Result<(), eyre::Report> {
    let player_id = PlayerId::parse(&player).wrap_err("parse scenario player id")?;
    let listed = run_async(world.harness()?.service.list_for_player(player_id));
    let newest = listed
        .first()
        .ok_or_else(|| eyre::eyre!("player {player} has no messages"))?;
    if newest.text().as_str() != text {
        return Err(eyre::eyre!(
            "expected newest message '{text}', found '{}'",
            newest.text()
        ));
    }
    Ok(())
}

#[then("the store is reported unavailable")]
fn store_unavailable(world: &AvailabilityWorld) -> Result<(), eyre::Report> {
    if run_async(world.harness()?.service.is_available()) {
        return Err(eyre::eyre!("expected the store to be unavailable"));
    }
    Ok(())
}

#[then("the store is reported available")]
fn store_available(world: &AvailabilityWorld) -> Result<(), eyre::Report> {
    if !run_async(world.harness()?.service.is_available()) {
        return Err(eyre::eyre!("expected the store to be available"));
    }
    Ok(())
}

#[then("the store handle is uninitialized")]
fn handle_uninitialized(world: &AvailabilityWorld) -> Result<(), eyre::Report> {
    let state = world.harness()?.service.state();
    if state != StoreState::Uninitialized {
        return Err(eyre::eyre!("expected uninitialized handle, found {state}"));
    }
    Ok(())
}

#[then("{count:usize} sessions were built")]
fn sessions_built(world: &AvailabilityWorld, count: usize) -> Result<(), eyre::Report> {
    let built = world.harness()?.connector.connects();
    if built != count {
        return Err(eyre::eyre!("expected {count} sessions, found {built}"));
    }
    Ok(())
}
