//! CPU emulation of a one-dimensional compute dispatch.

/// Threads per workgroup for every compute kernel (x dimension only).
pub const WORKGROUP_SIZE: u32 = 64;

/// Number of workgroups needed to cover `invocations` threads.
#[inline]
pub fn workgroup_count(invocations: u32) -> u32 {
    invocations.div_ceil(WORKGROUP_SIZE)
}

/// Runs `f` once per invocation id in `0..invocations`, workgroup by workgroup.
///
/// Threads of the trailing partial workgroup past `invocations` are not run;
/// the WGSL kernels return early for them.
pub fn for_each_invocation(invocations: usize, mut f: impl FnMut(usize)) {
    let group = WORKGROUP_SIZE as usize;
    let groups = invocations.div_ceil(group);
    for g in 0..groups {
        let start = g * group;
        let end = (start + group).min(invocations);
        for id in start..end {
            f(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workgroup_count_rounds_up() {
        assert_eq!(workgroup_count(0), 0);
        assert_eq!(workgroup_count(1), 1);
        assert_eq!(workgroup_count(64), 1);
        assert_eq!(workgroup_count(65), 2);
        assert_eq!(workgroup_count(640), 10);
    }

    #[test]
    fn every_invocation_runs_once() {
        let mut seen = vec![0u32; 130];
        for_each_invocation(seen.len(), |id| seen[id] += 1);
        assert!(seen.iter().all(|&n| n == 1));
    }

    #[test]
    fn empty_dispatch_runs_nothing() {
        let mut calls = 0;
        for_each_invocation(0, |_| calls += 1);
        assert_eq!(calls, 0);
    }
}
