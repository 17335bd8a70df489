//! Behavioural steps for patch ordering.

use cucumber::{World, given, then, when};
use patcher::{Call, CallLog, MockPatcher, Patch, PatchMaster};

#[derive(Debug, Default, World)]
pub struct MasterWorld {
    log: CallLog,
    master: PatchMaster<'static>,
}

fn describe(call: &Call) -> String {
    match call {
        Call::Install(name) => format!("install {name}"),
        Call::Restore(name) => format!("restore {name}"),
    }
}

#[given(regex = r#"^a patch master with patches "(.+)" and "(.+)"$"#)]
fn master_with_patches(world: &mut MasterWorld, first: String, second: String) {
    world.master = PatchMaster::new()
        .with(MockPatcher::new(first).recording_to(&world.log))
        .with(MockPatcher::new(second).recording_to(&world.log));
}

#[given(regex = r#"^patch "(.+)" is added$"#)]
fn patch_is_added(world: &mut MasterWorld, name: String) {
    world
        .master
        .add(MockPatcher::new(name).recording_to(&world.log));
}

#[when("the master is installed")]
fn master_installed(world: &mut MasterWorld) {
    world.master.install();
}

#[when("the master is restored")]
fn master_restored(world: &mut MasterWorld) {
    world.master.restore();
}

#[then(regex = r#"^the calls were "(.*)"$"#)]
fn the_calls_were(world: &mut MasterWorld, expected: String) {
    let actual: Vec<String> = world.log.calls().iter().map(describe).collect();
    assert_eq!(actual.join(", "), expected);
}
