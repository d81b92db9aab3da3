// Drives the compiled binary through a PTY, exercising the real event loop
// and crossterm input handling.
//
// Notes:
// - Requires a TTY; uses expectrl which allocates a pseudo terminal.
// - Unix-only and ignored by default.
// - Run manually via: `cargo test --test integration_min_session -- --ignored`.

#![cfg(unix)]

use std::time::Duration;

use expectrl::{spawn, Eof};

#[test]
#[ignore]
fn minimal_free_session_completes_and_exits() -> Result<(), Box<dyn std::error::Error>> {
    let bin = assert_cmd::cargo::cargo_bin("keyrate");
    let log = tempfile::NamedTempFile::new()?;
    let cmd = format!(
        "{} --free -p hi --log-file {}",
        bin.display(),
        log.path().display()
    );

    let mut p = spawn(cmd)?;

    // let the app enter the alternate screen
    std::thread::sleep(Duration::from_millis(200));

    p.send("hi")?;
    std::thread::sleep(Duration::from_millis(200));

    // esc starts over, ctrl+c quits
    p.send("\x1b")?;
    p.send("\x03")?;

    p.expect(Eof)?;
    Ok(())
}
