//! Behavioural steps for variable patches.
#![expect(clippy::expect_used, reason = "simplify test failure output")]

use std::sync::{Arc, Mutex, PoisonError};

use cucumber::{World, given, then, when};
use patcher::{AnyCell, AssignError, Patch, VariableSetter, set_var, try_set_var_any};

#[derive(Debug, Default, World)]
pub struct VariableWorld {
    cell: Arc<Mutex<String>>,
    patch: Option<VariableSetter<Arc<Mutex<String>>>>,
    any_cell: Option<AnyCell>,
    error: Option<AssignError>,
}

impl VariableWorld {
    fn patch(&mut self) -> &mut VariableSetter<Arc<Mutex<String>>> {
        self.patch.as_mut().expect("patch created")
    }
}

#[given(regex = r#"^a variable holding "(.*)"$"#)]
fn a_variable_holding(world: &mut VariableWorld, value: String) {
    world.cell = Arc::new(Mutex::new(value));
}

#[given(regex = r#"^a dynamically typed variable holding "(.*)"$"#)]
fn a_dynamic_variable_holding(world: &mut VariableWorld, value: String) {
    world.any_cell = Some(AnyCell::new(value));
}

#[when(regex = r#"^a patch setting it to "(.*)" is installed$"#)]
fn a_patch_is_installed(world: &mut VariableWorld, value: String) {
    let mut patch = set_var(Arc::clone(&world.cell), value);
    patch.install();
    world.patch = Some(patch);
}

#[when("the patch is installed again")]
fn the_patch_is_installed_again(world: &mut VariableWorld) {
    world.patch().install();
}

#[when("the patch is restored")]
fn the_patch_is_restored(world: &mut VariableWorld) {
    world.patch().restore();
}

#[when("the patch is restored again")]
fn the_patch_is_restored_again(world: &mut VariableWorld) {
    world.patch().restore();
}

#[when(regex = r#"^the code under test sets the variable to "(.*)"$"#)]
fn code_under_test_writes(world: &mut VariableWorld, value: String) {
    *world.cell.lock().unwrap_or_else(PoisonError::into_inner) = value;
}

#[when(regex = r"^it is patched with the integer (\d+)$")]
fn patched_with_integer(world: &mut VariableWorld, value: i32) {
    let cell = world.any_cell.as_ref().expect("dynamic variable");
    world.error = try_set_var_any(cell, value).err();
}

#[then(regex = r#"^the variable holds "(.*)"$"#)]
fn the_variable_holds(world: &mut VariableWorld, expected: String) {
    let actual = world
        .cell
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();
    assert_eq!(actual, expected);
}

#[then(regex = r#"^construction fails with "(.*)"$"#)]
fn construction_fails_with(world: &mut VariableWorld, message: String) {
    match world.error.take() {
        Some(err) => assert!(
            err.to_string().starts_with(&message),
            "unexpected error: {err}"
        ),
        None => panic!("expected construction to fail"),
    }
}
