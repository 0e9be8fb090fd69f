use crate::node::TreeNode;

/// Iterator over a Q-node's children in chain order.
///
/// The chain is linearized from the left endmost child toward the stored
/// `right` links, ending at the right endmost child. The walk is finite
/// and not restartable; build a fresh walker to iterate again, or use
/// [`QChildren::span`] to walk a sub-chain (the other direction is
/// obtained by reversing the Q-node itself).
///
/// On a pseudo-node the endmost children keep their links to siblings
/// outside the represented block. The walker never follows them: the
/// first step already moves toward the stored `right` link and the stop
/// index bounds the walk, regardless of the outside siblings' labels.
pub(crate) struct QChildren<'t> {
    nodes: &'t [TreeNode],
    next: Option<usize>,
    stop: usize,
}

impl<'t> QChildren<'t> {
    pub(crate) fn new(nodes: &'t [TreeNode], q: usize) -> QChildren<'t> {
        let q = nodes[q].node.as_q();
        QChildren::span(nodes, q.left, q.right)
    }

    /// Walk the sub-chain from `first` to `last` inclusive.
    pub(crate) fn span(nodes: &'t [TreeNode], first: usize, last: usize) -> QChildren<'t> {
        QChildren { nodes, next: Some(first), stop: last }
    }
}

impl Iterator for QChildren<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let current = self.next?;
        self.next = if current == self.stop { None } else { Some(self.nodes[current].rel.right()) };
        Some(current)
    }
}
