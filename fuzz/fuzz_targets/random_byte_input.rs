#![no_main]

use idfkit::{SchemaRegistry, Workspace};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        let _ = Workspace::parse(text, &SchemaRegistry::builtin());
    }
});
