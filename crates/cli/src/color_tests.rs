// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;

fn with_color<T>(f: impl FnOnce() -> T) -> T {
    std::env::remove_var("NO_COLOR");
    std::env::set_var("COLOR", "1");
    let out = f();
    std::env::remove_var("COLOR");
    out
}

#[test]
#[serial]
fn state_classification_uses_first_word() {
    with_color(|| {
        assert_ne!(state("pushed"), "pushed");
        assert_ne!(state("failed: remote gone"), "failed: remote gone");
        assert_ne!(state("in-sync"), "in-sync");
        // Unknown words stay unstyled
        assert_eq!(
            state("something else entirely"),
            "something else entirely"
        );
    });
}

#[test]
#[serial]
fn state_color_codes() {
    let cases = [
        ("pushed", "\x1b[32m"),
        ("in-sync", "\x1b[32m"),
        ("needs-push", "\x1b[33m"),
        ("dry-run: would push title", "\x1b[33m"),
        ("failed: boom", "\x1b[31m"),
        ("conflict (manual resolution required)", "\x1b[31m"),
    ];
    with_color(|| {
        for (text, prefix) in cases {
            let out = state(text);
            assert!(out.starts_with(prefix), "{text}: got {out:?}");
        }
    });
}

#[test]
#[serial]
fn no_color_disables_everything() {
    std::env::set_var("NO_COLOR", "1");
    assert_eq!(state("pushed"), "pushed");
    assert_eq!(green("x"), "x");
    assert_eq!(red("x"), "x");
    assert_eq!(header("x"), "x");
    assert_eq!(muted("x"), "x");
    std::env::remove_var("NO_COLOR");
}
