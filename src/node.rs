//! Tree nodes and the height bookkeeping shared by rotation and insertion.
//!
//! Every node is exclusively owned by its parent's [`Link`] (or by the tree's
//! root link). Nothing outside the tree keeps node handles, so releasing a
//! subtree never needs reference counting.

/// Owning handle to an optional subtree.
pub type Link<K, V> = Option<Box<Node<K, V>>>;

/// Height of an absent subtree.
pub const EMPTY_HEIGHT: i32 = -1;

/// A single AVL tree node.
///
/// `height` is a cache of `1 + max(height(left), height(right))`. It is only
/// rewritten by the rotation and insertion code in this crate; the public
/// surface is read-only apart from the value.
#[derive(Clone)]
pub struct Node<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) height: i32,
    pub(crate) left: Link<K, V>,
    pub(crate) right: Link<K, V>,
}

impl<K, V> Node<K, V> {
    /// Create a leaf (height 0).
    pub fn new(key: K, value: V) -> Self {
        Self {
            key,
            value,
            height: 0,
            left: None,
            right: None,
        }
    }

    /// Create a node that adopts `left` and `right` as its subtrees.
    ///
    /// The height is computed from the children. No ordering or balance check
    /// is performed here; callers hand-building trees are responsible for
    /// the invariants.
    pub fn with_children(key: K, value: V, left: Link<K, V>, right: Link<K, V>) -> Self {
        let mut node = Self {
            key,
            value,
            height: 0,
            left,
            right,
        };
        node.update_height();
        node
    }

    /// Convenience for hand-built trees: box the node into a [`Link`].
    pub fn boxed(self) -> Link<K, V> {
        Some(Box::new(self))
    }

    #[inline]
    pub fn key(&self) -> &K {
        &self.key
    }

    #[inline]
    pub fn value(&self) -> &V {
        &self.value
    }

    #[inline]
    pub fn value_mut(&mut self) -> &mut V {
        &mut self.value
    }

    /// Cached height of this node.
    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    #[inline]
    pub fn left(&self) -> Option<&Node<K, V>> {
        self.left.as_deref()
    }

    #[inline]
    pub fn right(&self) -> Option<&Node<K, V>> {
        self.right.as_deref()
    }

    /// `height(right) - height(left)`. Positive means right-heavy.
    #[inline]
    pub fn balance_factor(&self) -> i32 {
        height_of(self.right()) - height_of(self.left())
    }

    /// Recompute the cached height from the children.
    ///
    /// Returns `true` if the cached value changed.
    #[inline]
    pub(crate) fn update_height(&mut self) -> bool {
        let height = calc_height(self);
        if self.height == height {
            return false;
        }
        self.height = height;
        true
    }
}

/// Height of an optional node: the cached height, or [`EMPTY_HEIGHT`].
#[inline]
pub fn height_of<K, V>(node: Option<&Node<K, V>>) -> i32 {
    node.map_or(EMPTY_HEIGHT, |n| n.height)
}

/// Height of `node` recomputed from its children's cached heights.
#[inline]
pub fn calc_height<K, V>(node: &Node<K, V>) -> i32 {
    1 + height_of(node.left()).max(height_of(node.right()))
}

/// Release every node of the subtree rooted at `link`, leaving it empty.
///
/// Uses an explicit stack instead of recursion. Returns the number of nodes
/// released.
pub(crate) fn release<K, V>(link: &mut Link<K, V>) -> usize {
    let mut released = 0usize;
    let mut stack: Vec<Box<Node<K, V>>> = Vec::new();
    if let Some(root) = link.take() {
        stack.push(root);
    }
    while let Some(mut node) = stack.pop() {
        if let Some(left) = node.left.take() {
            stack.push(left);
        }
        if let Some(right) = node.right.take() {
            stack.push(right);
        }
        released += 1;
    }
    released
}
