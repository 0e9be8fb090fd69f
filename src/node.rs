use enum_map::Enum;

use crate::rel::{ChildOfP, InteriorChildOfQ, LeftChildOfQ, Rel, RightChildOfQ};

/// Arena slot permanently reserved for the pseudo-node. Never reachable
/// from [`ROOT`]; only addressed directly by the two reduction passes.
pub(crate) const PSEUDONODE: usize = 0;
/// Arena slot of the tree root.
pub(crate) const ROOT: usize = 1;
/// Sentinel index meaning "no node".
pub(crate) const ABSENT: usize = usize::MAX;

/// Node payload, tagged by kind.
///
/// Leaves carry no inline data; their value lives in the tree's leaf index.
#[derive(Debug, Copy, Clone)]
pub(crate) enum Node {
    P(PNode),
    Q(QNode),
    L,
}

/// A P-node points at any one child of its circular sibling list; the
/// list order carries no meaning.
#[derive(Debug, Copy, Clone)]
pub(crate) struct PNode {
    pub(crate) child: usize,
}

/// A Q-node holds only its two endmost children; interior children are
/// reached through the per-child sibling links in [`Rel`].
#[derive(Debug, Copy, Clone)]
pub(crate) struct QNode {
    pub(crate) left: usize,
    pub(crate) right: usize,
}

impl Node {
    pub(crate) fn as_mut_p(&mut self) -> &mut PNode {
        if let Node::P(p) = self {
            p
        } else {
            panic!("not a P-node: {:?}", self);
        }
    }

    pub(crate) fn as_q(&self) -> &QNode {
        if let Node::Q(q) = self {
            q
        } else {
            panic!("not a Q-node: {:?}", self);
        }
    }

    pub(crate) fn as_mut_q(&mut self) -> &mut QNode {
        if let Node::Q(q) = self {
            q
        } else {
            panic!("not a Q-node: {:?}", self);
        }
    }
}

/// One arena cell: payload, link to the parent structure, and the
/// per-reduction scratch header.
#[derive(Debug, Clone)]
pub(crate) struct TreeNode {
    pub(crate) node: Node,
    pub(crate) rel: Rel,
    pub(crate) red: ReductionInfo,
}

impl TreeNode {
    /// The node's current parent. For interior Q-children the stored
    /// parent may lag behind the tree; it is refreshed by the bubble pass
    /// before anything trusts it, hence the mark assertion.
    pub(crate) fn parent_of_unblocked(&self) -> usize {
        match self.rel {
            Rel::Root => ABSENT,
            Rel::P(ChildOfP { parent, .. })
            | Rel::LQ(LeftChildOfQ { parent, .. })
            | Rel::RQ(RightChildOfQ { parent, .. }) => parent,
            Rel::IQ(InteriorChildOfQ { parent_of_unblocked, .. }) => {
                debug_assert_ne!(self.red.mark, Mark::Blocked);
                parent_of_unblocked
            }
        }
    }
}

/// Transient state consumed by a single reduction. The default value is
/// the reset state; the whole arena is restored to it at bubble entry.
#[derive(Debug, Clone, Default)]
pub(crate) struct ReductionInfo {
    pub(crate) mark: Mark,
    pub(crate) label: Label,
    pub(crate) pertinent_child_count: usize,
    pub(crate) pertinent_leaf_count: usize,
}

/// Bubble-pass mark. A queued node has been scheduled; blocked nodes sit
/// inside a Q-chain without a known parent and may later unblock through
/// a sibling.
#[derive(Debug, Eq, PartialEq, Copy, Clone, Default)]
pub(crate) enum Mark {
    #[default]
    Unmarked,
    Queued,
    Blocked,
    Unblocked,
}

/// Reduce-pass label. Partial nodes are Q-shaped with one mixed run;
/// singly-partial nodes have the run touching one end of the chain,
/// doubly-partial nodes have it strictly inside.
#[derive(Debug, Enum, Eq, PartialEq, Copy, Clone, Default)]
pub(crate) enum Label {
    #[default]
    Empty,
    Full,
    SinglyPartial,
    DoublyPartial,
}
