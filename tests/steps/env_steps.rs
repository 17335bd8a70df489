//! Behavioural steps for environment patches.
#![expect(clippy::expect_used, reason = "simplify test failure output")]

use std::ffi::OsStr;
use std::sync::Arc;

use cucumber::{World, given, then, when};
use patcher::{EnvPatcher, EnvStore, Patch, ProcessEnv, set_env, unset_env};
use test_support::RecordingEnv;

#[derive(Debug, Default, World)]
pub struct EnvWorld {
    name: Option<String>,
    patch: Option<EnvPatcher>,
    recording: Arc<RecordingEnv>,
    recorded: Option<EnvPatcher<Arc<RecordingEnv>>>,
}

impl EnvWorld {
    fn name(&self) -> String {
        self.name.clone().expect("variable named")
    }
}

#[given(regex = r#"^the environment variable "(.+)" is unset$"#)]
fn variable_is_unset(world: &mut EnvWorld, name: String) {
    ProcessEnv.unset(&name).expect("unset variable");
    world.name = Some(name);
}

#[given(regex = r#"^the environment variable "(.+)" is "(.*)"$"#)]
fn variable_is_set(world: &mut EnvWorld, name: String, value: String) {
    ProcessEnv
        .set(&name, OsStr::new(&value))
        .expect("set variable");
    world.name = Some(name);
}

#[given("an empty recording environment")]
fn empty_recording_environment(world: &mut EnvWorld) {
    world.recording = Arc::new(RecordingEnv::new());
}

#[when(regex = r#"^it is patched to "(.*)"$"#)]
fn patched_to(world: &mut EnvWorld, value: String) {
    let mut patch = set_env(world.name(), value);
    patch.install();
    world.patch = Some(patch);
}

#[when("it is unset by a patch")]
fn unset_by_patch(world: &mut EnvWorld) {
    let mut patch = unset_env(world.name());
    patch.install();
    world.patch = Some(patch);
}

#[when("the patch is restored")]
fn the_patch_is_restored(world: &mut EnvWorld) {
    world.patch.as_mut().expect("patch installed").restore();
}

#[when(regex = r#"^"(.+)" is unset in it by a patch$"#)]
fn unset_in_recording(world: &mut EnvWorld, name: String) {
    world.recorded = Some(EnvPatcher::unset_in(Arc::clone(&world.recording), name));
}

#[when("the recorded patch is installed and restored")]
fn recorded_round_trip(world: &mut EnvWorld) {
    world
        .recorded
        .as_mut()
        .expect("recorded patch")
        .install()
        .restore();
}

#[then(regex = r#"^the environment variable "(.+)" is unset$"#)]
fn variable_should_be_unset(_world: &mut EnvWorld, name: String) {
    assert!(std::env::var_os(&name).is_none(), "{name} is still set");
}

#[then(regex = r#"^the environment variable "(.+)" is "(.*)"$"#)]
fn variable_should_be(_world: &mut EnvWorld, name: String, expected: String) {
    assert_eq!(std::env::var(&name).as_deref(), Ok(expected.as_str()));
}

#[then("no unset call was recorded")]
fn no_unset_recorded(world: &mut EnvWorld) {
    assert!(!world.recording.unset_called());
}
