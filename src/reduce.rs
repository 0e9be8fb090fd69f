//! Pass 2 of a reduction: process the pertinent subtree bottom-up,
//! rewriting each node with the first matching Booth-Lueker template
//! (L1, P1-P6, Q1-Q3) until the pertinent root is reached. A node that
//! matches no template makes the constraint irreducible.
//!
//! P-templates first partition the circular child list by label and then
//! dispatch on the exact counts of full and singly-partial children.
//! Q-templates scan the chain once, read-only, to classify the full/
//! partial run and decide the orientation of every singly-partial child;
//! the recorded children are spliced into the chain afterwards. The
//! pseudo-node takes the same Q path: its endpoint splices land directly
//! on the siblings outside the block, which is all the reattachment the
//! block ever needs.

use std::collections::VecDeque;
use std::hash::Hash;

use enum_map::EnumMap;

use crate::errors::ReductionError;
use crate::node::{Label, Mark, Node, PNode, QNode, ReductionInfo, TreeNode, PSEUDONODE};
use crate::rel::{ChildOfP, LeftChildOfQ, Rel, RightChildOfQ};
use crate::sublist::ChildSpan;
use crate::tree::PQTree;
use crate::walk::QChildren;

/// Shape of a Q-node's full/partial run, as seen by one chain scan.
enum Run {
    /// No pertinent children left on this node.
    Empty,
    /// Q1: uniformly full.
    Full,
    /// Q2: one run touching an end of the chain.
    TouchesEnd,
    /// Q3: one run strictly inside the chain.
    Interior,
}

struct RunShape {
    run: Run,
    /// Singly-partial children to splice, with the orientation their
    /// chain must take: `true` when the empty end has to face left.
    merges: Vec<(usize, bool)>,
}

impl<T: Copy + Hash + Ord> PQTree<T> {
    pub(crate) fn reduce_pass(&mut self, s_nodes: &[usize]) -> Result<(), ReductionError<T>> {
        let mut queue: VecDeque<usize> = s_nodes.iter().copied().collect();
        for &leaf in s_nodes {
            // template L1
            self.nodes[leaf].red.pertinent_leaf_count = 1;
            self.nodes[leaf].red.label = Label::Full;
        }

        while let Some(x) = queue.pop_front() {
            let root = self.nodes[x].red.pertinent_leaf_count >= s_nodes.len();
            if !root {
                debug_assert_eq!(self.nodes[x].red.mark, Mark::Unblocked);

                let parent = self.nodes[x].parent_of_unblocked();
                self.nodes[parent].red.pertinent_leaf_count += self.nodes[x].red.pertinent_leaf_count;
                self.nodes[parent].red.pertinent_child_count -= 1;
                if self.nodes[parent].red.pertinent_child_count == 0 {
                    queue.push_back(parent);
                }
            }

            let matched = match self.nodes[x].node {
                Node::L => true, // L1 applied at seeding
                Node::P(PNode { child }) => self.match_p_templates(x, child, root),
                Node::Q(_) => self.match_q_templates(x),
            };
            if !matched {
                return Err(ReductionError::InconsistentConstraint);
            }
        }
        Ok(())
    }

    fn match_p_templates(&mut self, x: usize, first_child: usize, root: bool) -> bool {
        let split = self.partition_children(first_child);
        if !split[Label::DoublyPartial].is_empty() {
            return false;
        }

        let full = split[Label::Full].len();
        let empty = split[Label::Empty].len();
        let partial = split[Label::SinglyPartial].len();

        match (partial, root) {
            (0, _) if full == 0 => {
                // no pertinent children left on this node
                self.nodes[x].red.label = Label::Empty;
                true
            }
            (0, _) if empty == 0 => {
                // P1: uniformly full
                self.nodes[x].red.label = Label::Full;
                true
            }
            (0, true) => {
                // P2: the root packs its full children into a single child
                let full_child = self.adopt_span(&split[Label::Full], Label::Full);
                self.rebuild_p(x, &split[Label::Empty], full_child);
                true
            }
            (0, false) => {
                // P3: become a two-ended Q shell, empties on one side and
                // fulls on the other, consumed later by the parent's template
                let full_child = self.adopt_span(&split[Label::Full], Label::Full);
                let empty_child = self.adopt_span(&split[Label::Empty], Label::Empty);
                self.nodes[x].node = Node::Q(QNode { left: empty_child, right: full_child });
                self.nodes[empty_child].rel = Rel::LQ(LeftChildOfQ { parent: x, right: full_child });
                self.nodes[full_child].rel = Rel::RQ(RightChildOfQ { parent: x, left: empty_child });
                self.nodes[x].red.label = Label::SinglyPartial;
                true
            }
            (1, _) => self.match_p4_p5(x, &split, root),
            (2, true) => self.match_p6(x, &split),
            _ => false,
        }
    }

    /// P4 (root) / P5 (interior): the lone partial Q-child collects the
    /// full children on its full end; an interior node additionally hands
    /// its empties to the other end and dissolves into the Q-child.
    fn match_p4_p5(&mut self, x: usize, split: &EnumMap<Label, ChildSpan>, root: bool) -> bool {
        let sp = split[Label::SinglyPartial].first();
        let full_on_left = self.nodes[self.nodes[sp].node.as_q().left].red.label == Label::Full;

        if !split[Label::Full].is_empty() {
            let full_child = self.adopt_span(&split[Label::Full], Label::Full);
            self.attach_to_q(sp, full_child, full_on_left);
        }

        if root {
            // P4
            debug_assert!(
                !split[Label::Full].is_empty(),
                "a root with a lone partial child and no full children is below the pertinent root"
            );
            if !split[Label::Empty].is_empty() {
                self.rebuild_p(x, &split[Label::Empty], sp);
            } else {
                self.promote_q(x, sp);
            }
        } else {
            // P5
            if !split[Label::Empty].is_empty() {
                let empty_child = self.adopt_span(&split[Label::Empty], Label::Empty);
                self.attach_to_q(sp, empty_child, !full_on_left);
            }
            self.promote_q(x, sp);
        }
        true
    }

    /// P6: the root owns two partial Q-children; fuse them into one
    /// doubly-partial chain around the packed full children.
    fn match_p6(&mut self, x: usize, split: &EnumMap<Label, ChildSpan>) -> bool {
        let sp1 = split[Label::SinglyPartial].first();
        let sp2 = split[Label::SinglyPartial].last();

        // orient so `left` runs empty..full and `right` runs full..empty
        let sp1_empty_first = self.nodes[self.nodes[sp1].node.as_q().left].red.label == Label::Empty;
        let sp2_empty_first = self.nodes[self.nodes[sp2].node.as_q().left].red.label == Label::Empty;
        let (left, right) = match (sp1_empty_first, sp2_empty_first) {
            (true, false) => (sp1, sp2),
            (false, true) => (sp2, sp1),
            (true, true) => {
                self.reverse_q(sp2);
                (sp1, sp2)
            }
            (false, false) => {
                self.reverse_q(sp1);
                (sp1, sp2)
            }
        };
        debug_assert_ne!(left, PSEUDONODE);

        if !split[Label::Full].is_empty() {
            let full_child = self.adopt_span(&split[Label::Full], Label::Full);
            self.attach_to_q(left, full_child, false);
        }

        // fuse the chains: left's right end meets right's left end
        let seam_left = self.nodes[left].node.as_q().right;
        let seam_right = self.nodes[right].node.as_q().left;
        self.nodes[seam_left].rel = self.nodes[seam_left].rel.as_rq().to_iq(seam_right);
        self.nodes[seam_right].rel = self.nodes[seam_right].rel.as_lq().to_iq(seam_left);

        let new_right_end = self.nodes[right].node.as_q().right;
        self.nodes[left].node.as_mut_q().right = new_right_end;
        self.nodes[new_right_end].rel.as_mut_rq().parent = left;

        self.nodes[left].red.label = Label::DoublyPartial;
        self.recycle_node(right);

        if !split[Label::Empty].is_empty() {
            self.rebuild_p(x, &split[Label::Empty], left);
        } else {
            self.promote_q(x, left);
        }
        true
    }

    /// Q1, Q2 and Q3, plus the pseudo-node. Fails when the full/partial
    /// children do not form a single run with partials only on its ends.
    fn match_q_templates(&mut self, x: usize) -> bool {
        let shape = match self.scan_q_run(x) {
            Some(shape) => shape,
            None => return false,
        };

        for &(child, empty_leftward) in &shape.merges {
            self.splice_partial_into_chain(child, empty_leftward);
        }

        self.nodes[x].red.label = match shape.run {
            Run::Empty => Label::Empty,
            Run::Full => Label::Full,
            Run::TouchesEnd => Label::SinglyPartial,
            Run::Interior => Label::DoublyPartial,
        };
        true
    }

    /// One read-only pass over the chain: classify the full/partial run
    /// and decide, for each singly-partial child, which of its ends must
    /// face the surrounding empties.
    fn scan_q_run(&self, q: usize) -> Option<RunShape> {
        // Prefixes of well-formed chains: the run may open the chain (a
        // leading partial child stays undecided until its successor shows
        // which side of it the run continues on).
        enum State {
            Start,
            E,
            F,
            LeadingSp(usize),
            EF,
            FE,
            EFE,
        }

        let mut merges: Vec<(usize, bool)> = Vec::new();
        let mut state = State::Start;
        for child in QChildren::new(&self.nodes, q) {
            let label = self.nodes[child].red.label;
            state = match (state, label) {
                (_, Label::DoublyPartial) => return None,

                (State::Start, Label::Empty) => State::E,
                (State::Start, Label::Full) => State::F,
                (State::Start, Label::SinglyPartial) => State::LeadingSp(child),

                (s @ (State::E | State::FE | State::EFE), Label::Empty)
                | (s @ (State::F | State::EF), Label::Full) => s,

                (State::E, Label::Full) => State::EF,
                (State::F, Label::Empty) => State::FE,
                (State::EF, Label::Empty) => State::EFE,

                (State::FE | State::EFE, Label::Full | Label::SinglyPartial) => return None,

                (State::LeadingSp(sp), Label::Empty) => {
                    merges.push((sp, false));
                    State::FE
                }
                (State::LeadingSp(sp), Label::Full) => {
                    merges.push((sp, true));
                    State::EF
                }
                (State::LeadingSp(sp), Label::SinglyPartial) => {
                    merges.push((sp, true));
                    merges.push((child, false));
                    State::EFE
                }
                (State::E, Label::SinglyPartial) => {
                    merges.push((child, true));
                    State::EF
                }
                (State::F, Label::SinglyPartial) => {
                    merges.push((child, false));
                    State::FE
                }
                (State::EF, Label::SinglyPartial) => {
                    merges.push((child, false));
                    State::EFE
                }
            };
        }

        let run = match state {
            State::Start => unreachable!("Q-node with no children"),
            // a chain degenerated to a single partial child; bail out
            // instead of splicing a run with no surroundings
            State::LeadingSp(_) => return None,
            State::E => Run::Empty,
            State::F => Run::Full,
            State::EF | State::FE => Run::TouchesEnd,
            State::EFE => Run::Interior,
        };
        Some(RunShape { run, merges })
    }

    /// Replaces a singly-partial Q-child by its own chain of children,
    /// oriented so that its empty end faces the surrounding empties.
    fn splice_partial_into_chain(&mut self, child: usize, empty_leftward: bool) {
        if empty_leftward {
            self.orient_empty_left(child);
        } else {
            self.orient_empty_right(child);
        }

        let rel = self.nodes[child].rel;
        let first = self.nodes[child].node.as_q().left;
        let last = self.nodes[child].node.as_q().right;

        match rel {
            Rel::LQ(lq) => {
                self.nodes[lq.parent].node.as_mut_q().left = first;
                self.nodes[first].rel.as_mut_lq().parent = lq.parent;
                self.nodes[last].rel = self.nodes[last].rel.as_rq().to_iq(lq.right);
                *self.nodes[lq.right].rel.mut_left() = last;
            }
            Rel::RQ(rq) => {
                self.nodes[rq.parent].node.as_mut_q().right = last;
                self.nodes[last].rel.as_mut_rq().parent = rq.parent;
                self.nodes[first].rel = self.nodes[first].rel.as_lq().to_iq(rq.left);
                *self.nodes[rq.left].rel.mut_right() = first;
            }
            Rel::IQ(iq) => {
                self.nodes[first].rel = self.nodes[first].rel.as_lq().to_iq(iq.left);
                *self.nodes[iq.left].rel.mut_right() = first;
                self.nodes[last].rel = self.nodes[last].rel.as_rq().to_iq(iq.right);
                *self.nodes[iq.right].rel.mut_left() = last;
            }
            other => panic!("not a Q-child: {:?}", other),
        }
        self.recycle_node(child);
    }

    fn orient_empty_left(&mut self, q: usize) {
        if self.nodes[self.nodes[q].node.as_q().left].red.label != Label::Empty {
            self.reverse_q(q);
        }
    }

    fn orient_empty_right(&mut self, q: usize) {
        if self.nodes[self.nodes[q].node.as_q().right].red.label != Label::Empty {
            self.reverse_q(q);
        }
    }

    /// Flips a Q-node's chain in place: interior rels swap their link
    /// pair, the endmost rels swap sides.
    fn reverse_q(&mut self, q: usize) {
        debug_assert_ne!(q, PSEUDONODE);
        let mut current = self.nodes[self.nodes[q].node.as_q().left].rel.as_lq().right;
        while let Rel::IQ(iq) = &mut self.nodes[current].rel {
            current = iq.right;
            (iq.left, iq.right) = (iq.right, iq.left);
        }

        let (left, right) = {
            let node = self.nodes[q].node.as_mut_q();
            (node.left, node.right) = (node.right, node.left);
            (node.left, node.right)
        };
        let left_then = self.nodes[left].rel.as_rq().left;
        let right_then = self.nodes[right].rel.as_lq().right;
        self.nodes[left].rel = Rel::LQ(LeftChildOfQ { parent: q, right: left_then });
        self.nodes[right].rel = Rel::RQ(RightChildOfQ { parent: q, left: right_then });
    }

    /// Carves the circular child list into one sub-list per label in a
    /// single pass, re-wiring `next` pointers so that every sub-list is
    /// itself a well-formed circular list.
    fn partition_children(&mut self, first_child: usize) -> EnumMap<Label, ChildSpan> {
        let mut spans: EnumMap<Label, ChildSpan> = EnumMap::default();

        let mut prev_label = self.nodes[first_child].red.label;
        spans[prev_label].push(first_child);

        let mut current = self.nodes[first_child].rel.as_p().next;
        while current != first_child {
            let label = self.nodes[current].red.label;
            if label != prev_label {
                // close the sub-list we were extending...
                self.nodes[spans[prev_label].last()].rel.as_mut_p().next = spans[prev_label].first();
                // ...and continue this label's sub-list at `current`
                if !spans[label].is_empty() {
                    self.nodes[spans[label].last()].rel.as_mut_p().next = current;
                }
                prev_label = label;
            }
            spans[label].push(current);
            current = self.nodes[current].rel.as_p().next;
        }
        self.nodes[spans[prev_label].last()].rel.as_mut_p().next = spans[prev_label].first();

        spans
    }

    /// Wraps a span in a fresh P-node, unless it is a single child. The
    /// caller wires up the returned node's rel.
    fn adopt_span(&mut self, span: &ChildSpan, label: Label) -> usize {
        if span.len() == 1 {
            return span.first();
        }
        let owner = self.add_node(TreeNode {
            node: Node::P(PNode { child: span.first() }),
            rel: Rel::Root,
            red: ReductionInfo { label, ..ReductionInfo::default() },
        });
        let mut current = span.first();
        loop {
            self.nodes[current].rel.as_mut_p().parent = owner;
            current = self.nodes[current].rel.as_p().next;
            if current == span.first() {
                break;
            }
        }
        owner
    }

    /// Rebuilds a P-node's circular list as the empty span plus one
    /// extra child.
    fn rebuild_p(&mut self, p: usize, empties: &ChildSpan, extra: usize) {
        self.nodes[p].node.as_mut_p().child = empties.first();
        self.nodes[empties.last()].rel.as_mut_p().next = extra;
        self.nodes[extra].rel = Rel::P(ChildOfP { parent: p, next: empties.first() });
    }

    /// Attaches `child` as a new endmost child of `q` on the given side.
    fn attach_to_q(&mut self, q: usize, child: usize, on_left: bool) {
        if on_left {
            let old = self.nodes[q].node.as_q().left;
            self.nodes[child].rel = Rel::LQ(LeftChildOfQ { parent: q, right: old });
            self.nodes[old].rel = self.nodes[old].rel.as_lq().to_iq(child);
            self.nodes[q].node.as_mut_q().left = child;
        } else {
            let old = self.nodes[q].node.as_q().right;
            self.nodes[child].rel = Rel::RQ(RightChildOfQ { parent: q, left: old });
            self.nodes[old].rel = self.nodes[old].rel.as_rq().to_iq(child);
            self.nodes[q].node.as_mut_q().right = child;
        }
    }

    /// Moves a Q-node's payload into `target`'s slot, inheriting
    /// `target`'s place in the tree, and retires `source`.
    fn promote_q(&mut self, target: usize, source: usize) {
        debug_assert_ne!(target, PSEUDONODE);
        self.nodes[target].node = self.nodes[source].node;
        self.nodes[target].red.label = self.nodes[source].red.label;

        let left = self.nodes[target].node.as_q().left;
        let right = self.nodes[target].node.as_q().right;
        self.nodes[left].rel.as_mut_lq().parent = target;
        self.nodes[right].rel.as_mut_rq().parent = target;

        self.recycle_node(source);
    }
}
