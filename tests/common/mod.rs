#![allow(dead_code)]

use flatgeobuf::packed_r_tree::PackedRTree;
use flatgeobuf::{FeatureArgs, GeometryArgs, HeaderArgs};

pub const FGB_MAGIC_BYTES: [u8; 8] = [b'f', b'g', b'b', 3, b'f', b'g', b'b', 0];

/// Encode a FlatGeobuf stream of point features without a spatial index.
pub fn point_features(points: &[[f64; 2]]) -> Vec<u8> {
    encode_points(points, 0)
}

/// Encode a FlatGeobuf stream declaring a spatial index. The index bytes are
/// zero-filled; readers of the graph section only ever skip them.
pub fn point_features_indexed(points: &[[f64; 2]]) -> Vec<u8> {
    encode_points(points, 16)
}

fn encode_points(points: &[[f64; 2]], index_node_size: u16) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&FGB_MAGIC_BYTES);

    let mut fbb = flatbuffers::FlatBufferBuilder::new();
    let header_args = HeaderArgs {
        name: Some(fbb.create_string("vertices")),
        geometry_type: flatgeobuf::GeometryType::Point,
        features_count: points.len() as u64,
        index_node_size,
        ..Default::default()
    };
    let header = flatgeobuf::Header::create(&mut fbb, &header_args);
    fbb.finish_size_prefixed(header, None);
    out.extend_from_slice(fbb.finished_data());

    if index_node_size > 0 {
        let index_size = PackedRTree::index_size(points.len(), index_node_size);
        out.resize(out.len() + index_size, 0);
    }

    for point in points {
        let mut fbb = flatbuffers::FlatBufferBuilder::new();
        let xy = fbb.create_vector(point);
        let geometry = flatgeobuf::Geometry::create(
            &mut fbb,
            &GeometryArgs {
                xy: Some(xy),
                ..Default::default()
            },
        );
        let feature = flatgeobuf::Feature::create(
            &mut fbb,
            &FeatureArgs {
                geometry: Some(geometry),
                ..Default::default()
            },
        );
        fbb.finish_size_prefixed(feature, None);
        out.extend_from_slice(fbb.finished_data());
    }
    out
}

pub fn grid_points(count: usize) -> Vec<[f64; 2]> {
    (0..count).map(|i| [i as f64, (i * 2) as f64]).collect()
}
