// Process tree selection

use std::collections::HashSet;

use crate::process::types::ProcessInfo;

/// Every process belonging to the tree of `root`, excluding `root` itself.
///
/// A process belongs to the tree when it shares the root's process group or
/// descends from the root by parent pid. The group catches children that were
/// re-parented to init after their parent exited; the parent chain catches
/// children that moved to their own group.
pub fn process_tree(snapshot: &[ProcessInfo], root: u32, pgid: u32) -> Vec<ProcessInfo> {
    let mut members: HashSet<u32> = snapshot
        .iter()
        .filter(|p| p.pid != root && pgid != 0 && p.pgid == pgid)
        .map(|p| p.pid)
        .collect();
    members.insert(root);

    // Grow the set until no new descendant shows up.
    loop {
        let before = members.len();
        for p in snapshot {
            if members.contains(&p.ppid) {
                members.insert(p.pid);
            }
        }
        if members.len() == before {
            break;
        }
    }

    let mut out: Vec<ProcessInfo> = snapshot
        .iter()
        .filter(|p| p.pid != root && members.contains(&p.pid))
        .cloned()
        .collect();
    out.sort_by_key(|p| p.pid);
    out
}
