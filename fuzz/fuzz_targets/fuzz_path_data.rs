#![no_main]

use libfuzzer_sys::fuzz_target;
use vs_core::AffineMatrix;
use vs_parser::parse_path_data;
use vs_render_ass::{normalize_path, render_drawing};

fuzz_target!(|data: &[u8]| {
    let Ok(d) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(segments) = parse_path_data(d) else {
        return;
    };
    assert!(segments.iter().all(|segment| segment.has_valid_arity()));

    let ctm = AffineMatrix::scale(4.0, 4.0);
    if let Ok(terminals) = normalize_path(&segments, &ctm, true) {
        let _ = render_drawing(&terminals);
    }
});
