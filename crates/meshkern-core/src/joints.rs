//! Joint index remapping.
//!
//! Skinned meshes reference joints by their index in the source skin; the
//! joint palette is ordered differently. Remapping rewrites each vertex's
//! four joint indices in place through a lookup table.

use glam::UVec4;

use crate::dispatch::for_each_invocation;

/// Remaps the four joint indices of one vertex.
///
/// All four components are read before the result is produced, so writing it
/// back into the same slot is safe.
#[inline]
pub fn remap_joints(joints: UVec4, mapping: &[u32]) -> UVec4 {
    UVec4::new(
        mapping[joints.x as usize],
        mapping[joints.y as usize],
        mapping[joints.z as usize],
        mapping[joints.w as usize],
    )
}

/// Remaps every vertex in place. Invocation `i` only touches `joints[i]`.
///
/// # Panics
/// If a joint index is out of range for `mapping`.
pub fn remap_joints_pass(joints: &mut [UVec4], mapping: &[u32]) {
    for_each_invocation(joints.len(), |id| {
        joints[id] = remap_joints(joints[id], mapping);
    });
}

/// Builds a remap table from a sparse source-index to palette-index table.
///
/// Source indices that are not part of the palette map to joint 0.
pub fn joint_mapping_table(entries: &[Option<u32>]) -> Vec<u32> {
    entries.iter().map(|e| e.unwrap_or(0)).collect()
}

/// Composes two remap tables: the result maps `k` to `second[first[k]]`.
///
/// # Panics
/// If an entry of `first` is out of range for `second`.
pub fn compose_mappings(first: &[u32], second: &[u32]) -> Vec<u32> {
    first.iter().map(|&k| second[k as usize]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remap_replaces_each_component() {
        let mapping = [5, 6, 7, 8, 9];
        assert_eq!(remap_joints(UVec4::new(0, 4, 2, 2), &mapping), UVec4::new(5, 9, 7, 7));
    }

    #[test]
    fn remap_twice_equals_composed_remap() {
        let m1 = [3, 0, 2, 1];
        let m2 = [1, 3, 3, 0];
        let original = vec![
            UVec4::new(0, 1, 2, 3),
            UVec4::new(3, 3, 0, 1),
            UVec4::new(2, 0, 0, 2),
        ];

        let mut twice = original.clone();
        remap_joints_pass(&mut twice, &m1);
        remap_joints_pass(&mut twice, &m2);

        let mut once = original;
        remap_joints_pass(&mut once, &compose_mappings(&m1, &m2));

        assert_eq!(twice, once);
    }

    #[test]
    fn identity_mapping_is_idempotent() {
        let identity: Vec<u32> = (0..8).collect();
        let mut joints = vec![UVec4::new(7, 1, 0, 3), UVec4::new(2, 2, 5, 6)];
        let expected = joints.clone();
        remap_joints_pass(&mut joints, &identity);
        remap_joints_pass(&mut joints, &identity);
        assert_eq!(joints, expected);
    }

    #[test]
    fn non_idempotent_mapping_changes_on_second_pass() {
        let shift = [1, 2, 3, 0];
        let mut joints = vec![UVec4::new(0, 1, 2, 3)];
        remap_joints_pass(&mut joints, &shift);
        assert_eq!(joints[0], UVec4::new(1, 2, 3, 0));
        remap_joints_pass(&mut joints, &shift);
        assert_eq!(joints[0], UVec4::new(2, 3, 0, 1));
    }

    #[test]
    fn unmapped_entries_fall_back_to_joint_zero() {
        let table = joint_mapping_table(&[Some(2), None, Some(0), None, Some(1)]);
        assert_eq!(table, vec![2, 0, 0, 0, 1]);
    }
}
