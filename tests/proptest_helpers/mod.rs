#![allow(dead_code)]

use proptest::collection::vec;
use proptest::prelude::*;
use proptest::strategy::BoxedStrategy;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

use roicodec::roi::{RoiBox, RoiRecord, Shape};

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

pub fn arb_box() -> impl Strategy<Value = RoiBox> {
    (any::<i16>(), any::<i16>(), any::<i16>(), any::<i16>())
        .prop_map(|(top, left, bottom, right)| RoiBox::new(top, left, bottom, right))
}

/// Coordinate pairs that fit the 16-bit on-disk representation.
pub fn arb_points(max_points: usize) -> impl Strategy<Value = (Vec<i32>, Vec<i32>)> {
    vec((any::<i16>(), any::<i16>()), 0..=max_points).prop_map(|points| {
        points
            .into_iter()
            .map(|(x, y)| (i32::from(x), i32::from(y)))
            .unzip()
    })
}

/// Names in the printable Latin-1 range, including the empty name.
pub fn arb_name() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(None),
        "[a-zA-Z0-9_\\-. ]{1,24}".prop_map(Some),
        "[\u{a0}-\u{ff}]{1,8}".prop_map(Some),
    ]
}

fn finite_f32() -> impl Strategy<Value = f32> {
    -1.0e6f32..1.0e6f32
}

/// Every shape the encoder can write.
pub fn arb_writable_shape(max_points: usize) -> BoxedStrategy<Shape> {
    let multi_point = (0u8..4, arb_box(), arb_points(max_points)).prop_map(|(variant, bbox, (x, y))| {
        match variant {
            0 => Shape::polygon(bbox, x, y),
            1 => Shape::free_line(bbox, x, y),
            2 => Shape::polyline(bbox, x, y),
            _ => Shape::freehand(bbox, x, y),
        }
        .expect("unzipped points have equal lengths")
    });

    prop_oneof![
        (arb_box(), 0i16..=100).prop_map(|(bbox, arc)| Shape::rounded_rect(bbox, arc)),
        arb_box().prop_map(Shape::oval),
        (finite_f32(), finite_f32(), finite_f32(), finite_f32())
            .prop_map(|(x1, y1, x2, y2)| Shape::line(x1, y1, x2, y2)),
        multi_point,
    ]
    .boxed()
}

pub fn arb_record(max_points: usize) -> impl Strategy<Value = RoiRecord> {
    (
        arb_writable_shape(max_points),
        arb_name(),
        0i32..1000,
        0i32..16,
    )
        .prop_map(|(shape, name, position, channel)| {
            let mut record = RoiRecord::new(shape)
                .with_header_value("POSITION", position)
                .with_header_value("C_POSITION", channel);
            record.name = name;
            record
        })
}
