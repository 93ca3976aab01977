#![no_main]

use libfuzzer_sys::fuzz_target;

use kinepong_core::ControlTargets;
use kinepong_state::LandmarkResolver;
use kinepong_wire::{decode_frame, PoseExtractor};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(doc) = decode_frame(text) else {
        return;
    };

    let extraction = PoseExtractor::default().extract(&doc);
    let resolver = LandmarkResolver::default();
    let mut targets = ControlTargets::new();
    if let Some(primary) = extraction.primary() {
        resolver.update(&mut targets, primary);
    }

    for (_, target) in targets.iter() {
        if let Some(p) = target {
            assert!((0.0..=1920.0).contains(&p.x));
            assert!((0.0..=1080.0).contains(&p.y));
        }
    }
});
