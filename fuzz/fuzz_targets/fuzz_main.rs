// SPDX-License-Identifier: AGPL-3.0-or-later
#![no_main]

use libfuzzer_sys::fuzz_target;
use linemark_core::{Document, MemoryLoader, OutputFormat, ParseConfig, RenderConfig};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(doc) = Document::parse(text, &ParseConfig::default()) else {
        return;
    };
    let loader = MemoryLoader::new();
    let config = RenderConfig::default();
    for format in OutputFormat::ALL {
        let _ = doc.render_bytes(format, &config, &loader);
    }
});
