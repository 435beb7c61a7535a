//! Unit tests for environment guards.

use super::*;

fn value_of(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

#[test]
fn set_var_restores_previous_value() {
    let key = "DOTENV_HELPERS_SET";
    let _outer = set_var(key, "before");
    {
        let _inner = set_var(key, "during");
        assert_eq!(value_of(key).as_deref(), Some("during"));
    }
    assert_eq!(value_of(key).as_deref(), Some("before"));
}

#[test]
fn set_var_unsets_when_previously_absent() {
    let key = "DOTENV_HELPERS_ABSENT";
    let cleared = remove_var(key);
    {
        let _guard = set_var(key, "temporary");
        assert_eq!(value_of(key).as_deref(), Some("temporary"));
    }
    assert_eq!(value_of(key), None);
    drop(cleared);
}

#[test]
fn remove_var_restores_value() {
    let key = "DOTENV_HELPERS_REMOVE";
    let _outer = set_var(key, "kept");
    {
        let _guard = remove_var(key);
        assert_eq!(value_of(key), None);
    }
    assert_eq!(value_of(key).as_deref(), Some("kept"));
}

#[test]
fn scope_restores_every_guard() {
    let first = "DOTENV_HELPERS_SCOPE_A";
    let second = "DOTENV_HELPERS_SCOPE_B";
    let _a = set_var(first, "a");
    let _b = set_var(second, "b");
    {
        let _scope = scope_with(|lock| vec![lock.remove_var(first), lock.set_var(second, "changed")]);
        assert_eq!(value_of(first), None);
        assert_eq!(value_of(second).as_deref(), Some("changed"));
    }
    assert_eq!(value_of(first).as_deref(), Some("a"));
    assert_eq!(value_of(second).as_deref(), Some("b"));
}

#[test]
fn isolate_git_clears_location_variables() {
    let _dir = set_var("GIT_DIR", "/nonexistent/.git");
    {
        let _scope = isolate_git();
        for key in GIT_LOCATION_VARS {
            assert_eq!(value_of(key), None, "{key} should be cleared");
        }
    }
    assert_eq!(value_of("GIT_DIR").as_deref(), Some("/nonexistent/.git"));
}
