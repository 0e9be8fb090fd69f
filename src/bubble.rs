//! Pass 1 of a reduction: climb from the pertinent leaves, refresh the
//! lazy parent pointers, and count pertinent children, so that the reduce
//! pass can process the pertinent subtree bottom-up.
//!
//! A node popped from the queue is *blocked* while its parent is unknown,
//! which can only happen to interior Q-children. Blocked runs dissolve
//! when a neighbour with a known parent appears; a run that survives the
//! whole pass is strictly interior to a Q-node that is not itself
//! pertinent, and is handed to the reduce pass through the reserved
//! pseudo-node slot.

use std::collections::{HashSet, VecDeque};
use std::hash::Hash;

use crate::errors::ReductionError;
use crate::node::{Mark, Node, QNode, ReductionInfo, TreeNode, ABSENT, PSEUDONODE};
use crate::rel::Rel;
use crate::tree::PQTree;

impl<T: Copy + Hash + Ord> PQTree<T> {
    pub(crate) fn bubble(&mut self, s_nodes: &[usize]) -> Result<(), ReductionError<T>> {
        for cell in self.nodes.iter_mut() {
            cell.red = ReductionInfo::default();
        }

        let mut queue: VecDeque<usize> = s_nodes.iter().copied().collect();
        let mut blocked: HashSet<usize> = HashSet::new();
        let mut block_count = 0usize;
        let mut off_the_top = 0usize;

        while queue.len() + block_count + off_the_top > 1 {
            let x = match queue.pop_front() {
                Some(x) => x,
                None => return Err(ReductionError::InconsistentConstraint),
            };

            // Only an interior Q-child can stay blocked: everything else
            // either knows its parent or sits at the end of a chain.
            let mut rel = self.nodes[x].rel;
            let (left_blocked, right_blocked) = match &mut rel {
                Rel::IQ(iq) => {
                    let left_mark = self.nodes[iq.left].red.mark;
                    let right_mark = self.nodes[iq.right].red.mark;
                    if left_mark == Mark::Unblocked {
                        iq.parent_of_unblocked = self.nodes[iq.left].parent_of_unblocked();
                        self.nodes[x].red.mark = Mark::Unblocked;
                    } else if right_mark == Mark::Unblocked {
                        iq.parent_of_unblocked = self.nodes[iq.right].parent_of_unblocked();
                        self.nodes[x].red.mark = Mark::Unblocked;
                    } else {
                        self.nodes[x].red.mark = Mark::Blocked;
                    }
                    (
                        (left_mark == Mark::Blocked).then_some(iq.left),
                        (right_mark == Mark::Blocked).then_some(iq.right),
                    )
                }
                Rel::LQ(lq) => {
                    self.nodes[x].red.mark = Mark::Unblocked;
                    (None, (self.nodes[lq.right].red.mark == Mark::Blocked).then_some(lq.right))
                }
                Rel::RQ(rq) => {
                    self.nodes[x].red.mark = Mark::Unblocked;
                    ((self.nodes[rq.left].red.mark == Mark::Blocked).then_some(rq.left), None)
                }
                Rel::Root | Rel::P(_) => {
                    self.nodes[x].red.mark = Mark::Unblocked;
                    (None, None)
                }
            };
            self.nodes[x].rel = rel;

            let adjacent_blocks = left_blocked.is_some() as usize + right_blocked.is_some() as usize;

            if self.nodes[x].red.mark == Mark::Unblocked {
                let parent = self.nodes[x].parent_of_unblocked();
                absorb_blocked_run(&mut self.nodes, parent, left_blocked, true, &mut blocked);
                absorb_blocked_run(&mut self.nodes, parent, right_blocked, false, &mut blocked);

                if parent == ABSENT {
                    off_the_top = 1;
                } else {
                    self.nodes[parent].red.pertinent_child_count += 1;
                    if self.nodes[parent].red.mark == Mark::Unmarked {
                        self.nodes[parent].red.mark = Mark::Queued;
                        queue.push_back(parent);
                    }
                }
                block_count -= adjacent_blocks;
            } else {
                blocked.insert(x);
                block_count += 1;
                block_count -= adjacent_blocks;
            }
        }

        if block_count > 1 || (off_the_top == 1 && block_count != 0) {
            return Err(ReductionError::InconsistentConstraint);
        }

        if let Some(&seed) = blocked.iter().next() {
            self.install_pseudonode(seed, &mut blocked);
        }
        Ok(())
    }

    /// A surviving block sits strictly inside some Q-node whose other
    /// children are not pertinent. The block stays physically linked in
    /// that chain; the pseudo-node merely addresses its two ends so the
    /// reduce pass can treat the run as a Q-node of its own.
    fn install_pseudonode(&mut self, seed: usize, blocked: &mut HashSet<usize>) {
        let left = absorb_blocked_run(&mut self.nodes, PSEUDONODE, Some(seed), true, blocked)
            .expect("pseudo-node seed was not blocked");
        let right = absorb_blocked_run(&mut self.nodes, PSEUDONODE, Some(seed), false, blocked)
            .expect("pseudo-node seed was not blocked");
        self.nodes[PSEUDONODE].node = Node::Q(QNode { left, right });
        // both absorption walks counted `seed`
        self.nodes[PSEUDONODE].red.pertinent_child_count -= 1;
    }
}

/// Unblocks the maximal run of blocked siblings starting at `first` and
/// walking leftward or rightward, handing each one to `parent`. Returns
/// the last node unblocked.
fn absorb_blocked_run(
    nodes: &mut [TreeNode],
    parent: usize,
    first: Option<usize>,
    leftward: bool,
    blocked: &mut HashSet<usize>,
) -> Option<usize> {
    let mut current = first?;
    let mut last = None;
    loop {
        nodes[current].red.mark = Mark::Unblocked;
        nodes[parent].red.pertinent_child_count += 1;
        blocked.remove(&current);
        last = Some(current);

        // only interior Q-children are ever blocked
        if let Rel::IQ(iq) = &mut nodes[current].rel {
            iq.parent_of_unblocked = parent;
            current = if leftward { iq.left } else { iq.right };
        } else {
            break;
        }
        if nodes[current].red.mark != Mark::Blocked {
            break;
        }
    }
    last
}
