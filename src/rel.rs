/// How a node hangs in the tree, from the node's own point of view.
///
/// P-children link to their parent and the next sibling of the circular
/// list. Q-children store the chain neighbours; only the two endmost
/// children carry an authoritative parent index, an interior child's
/// `parent_of_unblocked` may be stale until the bubble pass refreshes it.
#[derive(Debug, Copy, Clone)]
pub(crate) enum Rel {
    Root,
    P(ChildOfP),
    LQ(LeftChildOfQ),
    RQ(RightChildOfQ),
    IQ(InteriorChildOfQ),
}

#[derive(Debug, Copy, Clone)]
pub(crate) struct ChildOfP {
    pub(crate) parent: usize,
    pub(crate) next: usize,
}

#[derive(Debug, Copy, Clone)]
pub(crate) struct LeftChildOfQ {
    pub(crate) parent: usize,
    pub(crate) right: usize,
}

#[derive(Debug, Copy, Clone)]
pub(crate) struct RightChildOfQ {
    pub(crate) parent: usize,
    pub(crate) left: usize,
}

#[derive(Debug, Copy, Clone)]
pub(crate) struct InteriorChildOfQ {
    pub(crate) parent_of_unblocked: usize,
    pub(crate) left: usize,
    pub(crate) right: usize,
}

impl LeftChildOfQ {
    /// Demote to an interior child, gaining `left` as the new neighbour.
    #[must_use]
    pub(crate) fn to_iq(&self, left: usize) -> Rel {
        Rel::IQ(InteriorChildOfQ { parent_of_unblocked: self.parent, left, right: self.right })
    }
}

impl RightChildOfQ {
    /// Demote to an interior child, gaining `right` as the new neighbour.
    #[must_use]
    pub(crate) fn to_iq(&self, right: usize) -> Rel {
        Rel::IQ(InteriorChildOfQ { parent_of_unblocked: self.parent, left: self.left, right })
    }
}

impl Rel {
    pub(crate) fn as_p(&self) -> &ChildOfP {
        if let Rel::P(p) = self {
            p
        } else {
            panic!("not a P-child: {:?}", self);
        }
    }

    pub(crate) fn as_mut_p(&mut self) -> &mut ChildOfP {
        if let Rel::P(p) = self {
            p
        } else {
            panic!("not a P-child: {:?}", self);
        }
    }

    pub(crate) fn as_lq(&self) -> &LeftChildOfQ {
        if let Rel::LQ(lq) = self {
            lq
        } else {
            panic!("not a left Q-child: {:?}", self);
        }
    }

    pub(crate) fn as_mut_lq(&mut self) -> &mut LeftChildOfQ {
        if let Rel::LQ(lq) = self {
            lq
        } else {
            panic!("not a left Q-child: {:?}", self);
        }
    }

    pub(crate) fn as_rq(&self) -> &RightChildOfQ {
        if let Rel::RQ(rq) = self {
            rq
        } else {
            panic!("not a right Q-child: {:?}", self);
        }
    }

    pub(crate) fn as_mut_rq(&mut self) -> &mut RightChildOfQ {
        if let Rel::RQ(rq) = self {
            rq
        } else {
            panic!("not a right Q-child: {:?}", self);
        }
    }

    /// Chainward-right neighbour; defined for left and interior Q-children.
    pub(crate) fn right(&self) -> usize {
        match self {
            Rel::LQ(LeftChildOfQ { right, .. }) | Rel::IQ(InteriorChildOfQ { right, .. }) => *right,
            _ => panic!("no right neighbour: {:?}", self),
        }
    }

    pub(crate) fn mut_left(&mut self) -> &mut usize {
        match self {
            Rel::RQ(RightChildOfQ { left, .. }) | Rel::IQ(InteriorChildOfQ { left, .. }) => left,
            _ => panic!("no left neighbour: {:?}", self),
        }
    }

    pub(crate) fn mut_right(&mut self) -> &mut usize {
        match self {
            Rel::LQ(LeftChildOfQ { right, .. }) | Rel::IQ(InteriorChildOfQ { right, .. }) => right,
            _ => panic!("no right neighbour: {:?}", self),
        }
    }
}
