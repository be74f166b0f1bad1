//! Rotation primitives and the balance procedure.
//!
//! Each primitive takes ownership of a subtree root and returns the new root
//! of the restructured subtree; the caller re-attaches it to whatever slot
//! held the old root. Heights of the nodes a primitive relinks are correct
//! when it returns. Ancestors are not touched: insertion calls [`balance`]
//! again at every level while the recursion unwinds.

use crate::node::{height_of, Node};

/// Which restructuring [`balance`] applied (or would apply).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rotation {
    /// Right-right case.
    Left,
    /// Left-left case.
    Right,
    /// Right-left case: rotate the right child right, then the root left.
    DoubleLeft,
    /// Left-right case: rotate the left child left, then the root right.
    DoubleRight,
}

/// Counter-clockwise rotation: `root.right` becomes the subtree root.
///
/// # Panics
///
/// Panics if `root` has no right child.
pub fn rotate_left<K, V>(mut root: Box<Node<K, V>>) -> Box<Node<K, V>> {
    let Some(mut pivot) = root.right.take() else {
        panic!("rotate_left requires a right child");
    };
    root.right = pivot.left.take();
    root.update_height();
    pivot.left = Some(root);
    pivot.update_height();
    pivot
}

/// Clockwise rotation: `root.left` becomes the subtree root.
///
/// # Panics
///
/// Panics if `root` has no left child.
pub fn rotate_right<K, V>(mut root: Box<Node<K, V>>) -> Box<Node<K, V>> {
    let Some(mut pivot) = root.left.take() else {
        panic!("rotate_right requires a left child");
    };
    root.left = pivot.right.take();
    root.update_height();
    pivot.right = Some(root);
    pivot.update_height();
    pivot
}

/// `rotate_right(root.right)` followed by `rotate_left(root)`.
///
/// # Panics
///
/// Panics unless both `root.right` and `root.right.left` are present.
pub fn double_rotate_left<K, V>(mut root: Box<Node<K, V>>) -> Box<Node<K, V>> {
    let Some(right) = root.right.take() else {
        panic!("double_rotate_left requires a right child");
    };
    if right.left.is_none() {
        panic!("double_rotate_left requires a right-left grandchild");
    }
    root.right = Some(rotate_right(right));
    rotate_left(root)
}

/// `rotate_left(root.left)` followed by `rotate_right(root)`.
///
/// # Panics
///
/// Panics unless both `root.left` and `root.left.right` are present.
pub fn double_rotate_right<K, V>(mut root: Box<Node<K, V>>) -> Box<Node<K, V>> {
    let Some(left) = root.left.take() else {
        panic!("double_rotate_right requires a left child");
    };
    if left.right.is_none() {
        panic!("double_rotate_right requires a left-right grandchild");
    }
    root.left = Some(rotate_left(left));
    rotate_right(root)
}

/// Decide which rotation restores balance at `node`, if any.
///
/// When the heavy child's two subtrees have equal height the single rotation
/// is chosen.
pub fn balance_kind<K, V>(node: &Node<K, V>) -> Option<Rotation> {
    let left_height = height_of(node.left());
    let right_height = height_of(node.right());
    if (right_height - left_height).abs() <= 1 {
        return None;
    }

    if right_height > left_height {
        let Some(right) = node.right() else {
            unreachable!("right-heavy node without a right child");
        };
        if height_of(right.left()) > height_of(right.right()) {
            Some(Rotation::DoubleLeft)
        } else {
            Some(Rotation::Left)
        }
    } else {
        let Some(left) = node.left() else {
            unreachable!("left-heavy node without a left child");
        };
        if height_of(left.right()) > height_of(left.left()) {
            Some(Rotation::DoubleRight)
        } else {
            Some(Rotation::Right)
        }
    }
}

/// Restore the AVL balance condition at `node` with at most one rotation.
///
/// Only meaningful on a node whose height just changed; both of its subtrees
/// must already be balanced. Does not recurse.
pub fn balance<K, V>(node: Box<Node<K, V>>) -> Box<Node<K, V>> {
    let Some(rotation) = balance_kind(&node) else {
        return node;
    };
    tracing::trace!(?rotation, height = node.height, "rebalancing");
    match rotation {
        Rotation::Left => rotate_left(node),
        Rotation::Right => rotate_right(node),
        Rotation::DoubleLeft => double_rotate_left(node),
        Rotation::DoubleRight => double_rotate_right(node),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Link;

    fn leaf(key: i32) -> Link<i32, ()> {
        Node::new(key, ()).boxed()
    }

    fn branch(key: i32, left: Link<i32, ()>, right: Link<i32, ()>) -> Link<i32, ()> {
        Node::with_children(key, (), left, right).boxed()
    }

    fn take(link: Link<i32, ()>) -> Box<Node<i32, ()>> {
        link.expect("hand-built tree")
    }

    /// `(key, height)` of the root and its two children.
    fn shape(node: &Node<i32, ()>) -> (i32, i32, Option<(i32, i32)>, Option<(i32, i32)>) {
        (
            node.key,
            node.height,
            node.left().map(|n| (n.key, n.height)),
            node.right().map(|n| (n.key, n.height)),
        )
    }

    #[test]
    fn test_rotate_left_chain() {
        // 10 -> 20 -> 30 down the right spine.
        let root = take(branch(10, None, branch(20, None, leaf(30))));
        let root = rotate_left(root);
        assert_eq!(shape(&root), (20, 1, Some((10, 0)), Some((30, 0))));
    }

    #[test]
    fn test_rotate_right_chain() {
        let root = take(branch(30, branch(20, leaf(10), None), None));
        let root = rotate_right(root);
        assert_eq!(shape(&root), (20, 1, Some((10, 0)), Some((30, 0))));
    }

    #[test]
    fn test_rotate_left_moves_inner_subtree() {
        //     4                6
        //   2   6     =>     4   7
        //      5 7          2 5
        let root = take(branch(4, leaf(2), branch(6, leaf(5), leaf(7))));
        let root = rotate_left(root);
        assert_eq!(shape(&root), (6, 2, Some((4, 1)), Some((7, 0))));
        let old_root = root.left().expect("left");
        assert_eq!(old_root.left().map(|n| n.key), Some(2));
        assert_eq!(old_root.right().map(|n| n.key), Some(5));
    }

    #[test]
    fn test_double_rotate_left() {
        // 10 -> right 30 -> left 20
        let root = take(branch(10, None, branch(30, leaf(20), None)));
        let root = double_rotate_left(root);
        assert_eq!(shape(&root), (20, 1, Some((10, 0)), Some((30, 0))));
    }

    #[test]
    fn test_double_rotate_right() {
        // 30 -> left 10 -> right 20
        let root = take(branch(30, branch(10, None, leaf(20)), None));
        let root = double_rotate_right(root);
        assert_eq!(shape(&root), (20, 1, Some((10, 0)), Some((30, 0))));
    }

    #[test]
    #[should_panic(expected = "rotate_left requires a right child")]
    fn test_rotate_left_without_right_child_panics() {
        rotate_left(take(leaf(1)));
    }

    #[test]
    #[should_panic(expected = "rotate_right requires a left child")]
    fn test_rotate_right_without_left_child_panics() {
        rotate_right(take(leaf(1)));
    }

    #[test]
    #[should_panic(expected = "double_rotate_left requires a right-left grandchild")]
    fn test_double_rotate_left_without_grandchild_panics() {
        double_rotate_left(take(branch(1, None, branch(2, None, leaf(3)))));
    }

    #[test]
    #[should_panic(expected = "double_rotate_right requires a left-right grandchild")]
    fn test_double_rotate_right_without_grandchild_panics() {
        double_rotate_right(take(branch(3, branch(2, leaf(1), None), None)));
    }

    #[test]
    fn test_balance_kind_decisions() {
        let balanced = take(branch(2, leaf(1), leaf(3)));
        assert_eq!(balance_kind(&balanced), None);

        let right_right = take(branch(1, None, branch(2, None, leaf(3))));
        assert_eq!(balance_kind(&right_right), Some(Rotation::Left));

        let right_left = take(branch(1, None, branch(3, leaf(2), None)));
        assert_eq!(balance_kind(&right_left), Some(Rotation::DoubleLeft));

        let left_left = take(branch(3, branch(2, leaf(1), None), None));
        assert_eq!(balance_kind(&left_left), Some(Rotation::Right));

        let left_right = take(branch(3, branch(1, None, leaf(2)), None));
        assert_eq!(balance_kind(&left_right), Some(Rotation::DoubleRight));
    }

    #[test]
    fn test_balance_kind_prefers_single_on_tie() {
        // Right child has equal-height grandchildren on both sides.
        let right = branch(4, leaf(3), leaf(5));
        let root = take(branch(1, None, right));
        assert_eq!(balance_kind(&root), Some(Rotation::Left));
        let root = balance(root);
        assert_eq!(shape(&root), (4, 2, Some((1, 1)), Some((5, 0))));

        let left = branch(2, leaf(1), leaf(3));
        let root = take(branch(5, left, None));
        assert_eq!(balance_kind(&root), Some(Rotation::Right));
    }

    #[test]
    fn test_balance_noop_keeps_root() {
        let root = take(branch(2, leaf(1), None));
        let root = balance(root);
        assert_eq!(shape(&root), (2, 1, Some((1, 0)), None));
    }
}
