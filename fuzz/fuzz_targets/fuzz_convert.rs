#![no_main]

use libfuzzer_sys::fuzz_target;
use vs_core::RenderConfig;
use vs_render_ass::convert_svg;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        let _ = convert_svg(text, &RenderConfig::default());
    }
});
