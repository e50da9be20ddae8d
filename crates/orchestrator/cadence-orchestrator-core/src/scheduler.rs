//! Per-frame evaluation order across objects.
//!
//! Objects are visited depth-first in insertion order and emitted after everything they
//! depend on. A dependency on an object that is still on the DFS stack closes a cycle: the
//! edge is recorded and skipped, so the object it points at is read with whatever state it
//! currently holds.

use hashbrown::{HashMap, HashSet};
use serde::{Deserialize, Serialize};

use cadence_animation_core::ObjectId;

/// A dependency edge that was dropped to break a cycle: `from` reads `to` before `to`
/// has been evaluated this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleEdge {
    pub from: ObjectId,
    pub to: ObjectId,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleOrder {
    pub order: Vec<ObjectId>,
    pub cycles: Vec<CycleEdge>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Done,
}

/// Order `nodes` so every object follows the objects `deps` says it reads.
///
/// Dependencies on ids outside `nodes` and self-dependencies are ignored.
pub fn evaluation_order<F>(nodes: &[ObjectId], mut deps: F) -> ScheduleOrder
where
    F: FnMut(ObjectId) -> Vec<ObjectId>,
{
    let known: HashSet<ObjectId> = nodes.iter().copied().collect();
    let mut marks: HashMap<ObjectId, Mark> = HashMap::with_capacity(nodes.len());
    let mut out = ScheduleOrder {
        order: Vec::with_capacity(nodes.len()),
        cycles: Vec::new(),
    };

    for &root in nodes {
        if marks.contains_key(&root) {
            continue;
        }
        marks.insert(root, Mark::Visiting);
        let mut stack = vec![(root, deps(root).into_iter())];

        while let Some(top) = stack.last_mut() {
            let node = top.0;
            let Some(dep) = top.1.next() else {
                marks.insert(node, Mark::Done);
                out.order.push(node);
                stack.pop();
                continue;
            };
            if dep == node || !known.contains(&dep) {
                continue;
            }
            match marks.get(&dep) {
                None => {
                    marks.insert(dep, Mark::Visiting);
                    stack.push((dep, deps(dep).into_iter()));
                }
                Some(Mark::Visiting) => {
                    log::warn!(
                        "dependency cycle: object {:?} reads {:?} before it is evaluated",
                        node,
                        dep
                    );
                    out.cycles.push(CycleEdge { from: node, to: dep });
                }
                Some(Mark::Done) => {}
            }
        }
    }
    out
}
