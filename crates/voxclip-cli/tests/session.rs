//! Session behavior of the built binary.
//!
//! Only paths that need no audio hardware are exercised here: parameter
//! rejections happen before any device is opened, so these runs work on
//! machines without a microphone. Cargo builds the binary for this test
//! and exposes its path through `CARGO_BIN_EXE_voxclip`.

use std::path::Path;
use std::process::Command;

/// Run the binary with `args`, returning its stdout and exit status.
fn run(args: &[&str]) -> (String, bool) {
    let output = Command::new(env!("CARGO_BIN_EXE_voxclip"))
        .args(args)
        .output()
        .unwrap();
    (
        String::from_utf8_lossy(&output.stdout).into_owned(),
        output.status.success(),
    )
}

#[test]
fn oversized_duration_ends_the_session_normally() {
    let (stdout, ok) = run(&["--duration", "1e18", "--output", "oversized-session.wav"]);
    assert!(ok, "rejected parameters must not abort the process");
    assert!(stdout.contains("Recording failed:"));
    // The session stops before the conversion phase
    assert!(!stdout.contains("Converting speech to text..."));
    assert!(!stdout.contains("Processing audio..."));
    assert!(!Path::new("oversized-session.wav").exists());
}

#[test]
fn zero_duration_ends_the_session_normally() {
    let (stdout, ok) = run(&["--duration", "0", "--output", "zero-session.wav"]);
    assert!(ok, "rejected parameters must not abort the process");
    assert!(stdout.contains("Recording for 0 seconds..."));
    assert!(stdout.contains("Recording failed:"));
    assert!(!Path::new("zero-session.wav").exists());
}
