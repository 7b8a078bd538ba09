#![no_main]

use libfuzzer_sys::fuzz_target;
use vs_core::RenderConfig;
use vs_parser::parse_transform_list;
use vs_render_ass::plan_transform;

fuzz_target!(|data: &[u8]| {
    let Ok(value) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(list) = parse_transform_list(value) else {
        return;
    };

    let mut collapsed = list.clone();
    collapsed.collapse_adjacent();
    let kinds = |list: &vs_core::TransformList| {
        list.ops().iter().map(|op| op.kind()).collect::<Vec<_>>()
    };
    let once = kinds(&collapsed);
    collapsed.collapse_adjacent();
    assert_eq!(kinds(&collapsed), once);

    if let Ok(plan) = plan_transform(Some(&list), &RenderConfig::default()) {
        let _ = plan.tags();
    }
});
