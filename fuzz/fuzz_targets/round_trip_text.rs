#![no_main]

use idfkit::output::Output;
use idfkit::run_round_trip;
use libfuzzer_sys::fuzz_target;
use std::io;
use std::io::{Cursor, Write};

fuzz_target!(|data: &[u8]| {
    let _ = run_round_trip(Cursor::new(data), SinkOutput, "fuzz");
});

/// An output that goes to nowhere/ a "sink"/ /dev/null.
#[derive(Debug, Default)]
pub struct SinkOutput;

impl Output for SinkOutput {
    fn writer_for_location_key(&self, _location_key: &str) -> anyhow::Result<impl Write> {
        Ok(io::sink())
    }

    fn is_noop(&self) -> bool {
        // make the output pretend it's a no-op so fuzzing exercises code that calls it
        false
    }
}
