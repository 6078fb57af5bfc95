//! Key-space helpers over nested, possibly non-uniform containers.

use super::dimension::Dimension;
use super::frame_map::{FrameMap, DEFAULT_FRAME_DIM};
use super::key::{FrameKey, KeyValue};
use super::viewable::Viewable;

/// Frame maps holding at least one frame; empty maps contribute no keys.
fn frame_maps(obj: &Viewable) -> Vec<&FrameMap> {
    obj.traverse()
        .filter_map(|(_, node)| node.as_map())
        .filter(|m| !m.is_empty())
        .collect()
}

fn is_subset(a: &[&str], b: &[&str]) -> bool {
    a.iter().all(|name| b.contains(name))
}

/// Whether every frame map in `obj` varies over the same set of dimensions.
#[must_use]
pub fn uniform(obj: &Viewable) -> bool {
    let groups: Vec<Vec<&str>> = frame_maps(obj).iter().map(|m| m.kdim_names()).collect();
    groups
        .iter()
        .all(|a| groups.iter().all(|b| is_subset(a, b)))
}

/// The union of dimensions and keys of every frame map in `obj`.
///
/// Keys of maps lacking some of the dimensions are padded with
/// [`KeyValue::Missing`] and dropped when they are already covered by a more
/// complete key. An object without non-empty frame maps has a single `Frame`
/// dimension with one key.
#[must_use]
pub fn unique_dimkeys(obj: &Viewable) -> (Vec<Dimension>, Vec<FrameKey>) {
    let mut maps = frame_maps(obj);
    if maps.is_empty() {
        return (
            vec![Dimension::new(DEFAULT_FRAME_DIM)],
            vec![FrameKey::index(0)],
        );
    }
    maps.sort_by_key(|m| std::cmp::Reverse(m.ndims()));

    let names: Vec<Vec<&str>> = maps.iter().map(|m| m.kdim_names()).collect();
    let subset = names
        .iter()
        .all(|a| names.iter().all(|b| is_subset(a, b) || is_subset(b, a)));

    let mut dims: Vec<Dimension> = Vec::new();
    for map in &maps {
        for d in map.kdims() {
            if !dims.contains(d) {
                dims.push(d.clone());
            }
        }
    }
    if subset {
        let order = &names[0];
        dims.sort_by_key(|d| order.iter().position(|n| *n == d.name()).unwrap_or(usize::MAX));
    }

    let ndims = dims.len();
    let mut unique: Vec<FrameKey> = Vec::new();
    for map in &maps {
        let positions: Vec<usize> = map
            .kdims()
            .iter()
            .filter_map(|d| dims.iter().position(|x| x == d))
            .collect();
        for key in map.keys() {
            let mut padded = vec![KeyValue::Missing; ndims];
            for (j, idx) in positions.iter().enumerate() {
                if let Some(v) = key.get(j) {
                    padded[*idx] = v.clone();
                }
            }
            let covered = unique.iter().any(|existing| {
                existing
                    .values()
                    .iter()
                    .zip(&padded)
                    .all(|(e, p)| p.is_missing() || e == p)
            });
            if !covered {
                unique.push(FrameKey::new(padded));
            }
        }
    }

    if maps.iter().all(|m| m.is_sorted()) {
        unique.sort();
    }
    (dims, unique)
}
