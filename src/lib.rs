//! # avl-rs
//!
//! An ordered map backed by an AVL tree, with a max-value reduction that can
//! run either sequentially or as a fork-join over a rayon pool.
//!
//! ## Example
//!
//! ```rust
//! use avl_rs::{AvlTree, Entry, ParallelReducer, ReduceConfig};
//!
//! let mut tree: AvlTree<String, u64> = AvlTree::new();
//! for word in "the cat saw the other cat and the dog".split_whitespace() {
//!     match tree.entry(word.to_string()) {
//!         Entry::Occupied(mut e) => *e.get_mut() += 1,
//!         Entry::Vacant(e) => e.insert(1),
//!     }
//! }
//!
//! assert_eq!(tree.get("cat"), Some(&2));
//! assert_eq!(avl_rs::find_max_sequential(&tree), Some((&"the".to_string(), &3)));
//!
//! let reducer = ParallelReducer::new(ReduceConfig::default().with_cutoff(0)).unwrap();
//! assert_eq!(reducer.find_max(&tree), avl_rs::find_max_sequential(&tree));
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod node;
pub mod reduce;
pub mod rotate;

pub use error::{Error, Result, Violation};
pub use node::{calc_height, height_of, Link, Node, EMPTY_HEIGHT};
pub use reduce::{find_max, find_max_sequential, ParallelReducer, ReduceConfig, ReduceStats};
pub use rotate::{
    balance, balance_kind, double_rotate_left, double_rotate_right, rotate_left, rotate_right,
    Rotation,
};

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;

// =============================================================================
// AvlTree
// =============================================================================

/// An ordered map with unique keys, kept height-balanced by AVL rotations.
///
/// Nodes are never removed individually; [`AvlTree::clear`] (or dropping the
/// tree) releases all of them at once. Mutation is single-threaded. Shared
/// references may be read from many threads at once, which is what the
/// parallel reducer relies on.
pub struct AvlTree<K, V> {
    root: Link<K, V>,
    len: usize,
}

impl<K, V> AvlTree<K, V> {
    pub fn new() -> Self {
        Self { root: None, len: 0 }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Height of the root, or [`EMPTY_HEIGHT`] for an empty tree.
    #[inline]
    pub fn height(&self) -> i32 {
        height_of(self.root())
    }

    #[inline]
    pub fn root(&self) -> Option<&Node<K, V>> {
        self.root.as_deref()
    }

    /// Release every node. Returns the number of nodes released.
    pub fn clear(&mut self) -> usize {
        let released = node::release(&mut self.root);
        debug_assert_eq!(released, self.len);
        self.len = 0;
        tracing::debug!(released, "tree cleared");
        released
    }

    /// In-order iterator over `(key, value)` pairs.
    pub fn iter(&self) -> Iter<'_, K, V> {
        let mut iter = Iter {
            stack: Vec::new(),
            remaining: self.len,
        };
        iter.push_left_spine(self.root());
        iter
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.iter().map(|(_, v)| v)
    }

    /// Sum of every stored value.
    pub fn total_value<'a>(&'a self) -> V
    where
        V: std::iter::Sum<&'a V>,
    {
        self.values().sum()
    }

    /// Walk the tree in reverse in-order (largest key first), calling
    /// `f(key, height, level)` for every node. The root is at level 0.
    pub fn visit_reverse<F>(&self, mut f: F)
    where
        F: FnMut(&K, i32, usize),
    {
        fn walk<K, V, F: FnMut(&K, i32, usize)>(node: Option<&Node<K, V>>, level: usize, f: &mut F) {
            let Some(node) = node else {
                return;
            };
            walk(node.right(), level + 1, f);
            f(&node.key, node.height, level);
            walk(node.left(), level + 1, f);
        }
        walk(self.root(), 0, &mut f);
    }

    /// Sideways rendering of the tree: right subtree above, three spaces of
    /// indentation per level.
    pub fn pretty(&self) -> Pretty<'_, K, V> {
        Pretty { tree: self }
    }
}

impl<K: Ord, V> AvlTree<K, V> {
    /// Insert `key` with `value`, or combine `value` into the existing entry
    /// with `merge(existing, value)`.
    ///
    /// `merge` runs in place on the existing node, with the tree fully
    /// attached, so a panicking merge leaves every entry in the tree.
    ///
    /// Returns `true` if a new node was created.
    pub fn insert_with<F>(&mut self, key: K, value: V, merge: F) -> bool
    where
        F: FnOnce(&mut V, V),
    {
        if let Some(node) = Self::find_in_mut(&mut self.root, &key) {
            merge(&mut node.value, value);
            return false;
        }

        let root = Self::insert_node(self.root.take(), key, value);
        self.root = Some(root);
        self.len += 1;
        true
    }

    /// Insert `key` with `value`, overwriting any existing value.
    ///
    /// Returns the previous value if the key was already present.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let mut old = None;
        self.insert_with(key, value, |slot, value| {
            old = Some(std::mem::replace(slot, value));
        });
        old
    }

    /// Insert a key known to be absent, rebalancing on the way back up.
    fn insert_node(link: Link<K, V>, key: K, value: V) -> Box<Node<K, V>> {
        let Some(mut node) = link else {
            return Box::new(Node::new(key, value));
        };

        match key.cmp(&node.key) {
            Ordering::Less => {
                let left = Self::insert_node(node.left.take(), key, value);
                node.left = Some(left);
            }
            Ordering::Greater => {
                let right = Self::insert_node(node.right.take(), key, value);
                node.right = Some(right);
            }
            Ordering::Equal => {
                node.value = value;
                return node;
            }
        }

        if node.update_height() {
            rotate::balance(node)
        } else {
            node
        }
    }

    /// Look up `key`, returning either the node holding it or the point where
    /// it would be inserted.
    ///
    /// An occupied key is found with a shared walk and then reborrowed with a
    /// second, mutable one; a vacant entry keeps the whole tree so its insert
    /// can rebalance the path.
    pub fn entry(&mut self, key: K) -> Entry<'_, K, V> {
        if self.contains_key(&key) {
            match Self::find_in_mut(&mut self.root, &key) {
                Some(node) => Entry::Occupied(OccupiedEntry { node }),
                None => unreachable!("key vanished between lookups"),
            }
        } else {
            Entry::Vacant(VacantEntry { tree: self, key })
        }
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find_node(key).is_some()
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find_node(key).map(Node::value)
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find_node_mut(key).map(Node::value_mut)
    }

    /// Value stored under `key`.
    ///
    /// # Panics
    ///
    /// Panics if `key` is not present. Use [`AvlTree::get`] when absence is
    /// a normal outcome.
    pub fn lookup<Q>(&self, key: &Q) -> &V
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        match self.get(key) {
            Some(value) => value,
            None => panic!("lookup of a key that is not in the tree"),
        }
    }

    /// The node holding `key`, if any.
    pub fn find_node<Q>(&self, key: &Q) -> Option<&Node<K, V>>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut current = self.root();
        while let Some(node) = current {
            match key.cmp(node.key.borrow()) {
                Ordering::Less => current = node.left(),
                Ordering::Greater => current = node.right(),
                Ordering::Equal => return Some(node),
            }
        }
        None
    }

    /// Mutable access to the node holding `key`. Only the value can be
    /// changed through it.
    pub fn find_node_mut<Q>(&mut self, key: &Q) -> Option<&mut Node<K, V>>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        Self::find_in_mut(&mut self.root, key)
    }

    fn find_in_mut<'a, Q>(link: &'a mut Link<K, V>, key: &Q) -> Option<&'a mut Node<K, V>>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let node = link.as_deref_mut()?;
        match key.cmp(node.key.borrow()) {
            Ordering::Less => Self::find_in_mut(&mut node.left, key),
            Ordering::Greater => Self::find_in_mut(&mut node.right, key),
            Ordering::Equal => Some(node),
        }
    }

    /// Check BST order, balance, cached heights and the entry count.
    pub fn validate(&self) -> std::result::Result<(), Violation> {
        struct Walk<'a, K> {
            prev: Option<&'a K>,
            position: usize,
        }

        fn check<'a, K: Ord, V>(
            node: Option<&'a Node<K, V>>,
            walk: &mut Walk<'a, K>,
        ) -> std::result::Result<i32, Violation> {
            let Some(node) = node else {
                return Ok(EMPTY_HEIGHT);
            };
            let left = check(node.left(), walk)?;

            let position = walk.position;
            if walk.prev.is_some_and(|prev| *prev >= node.key) {
                return Err(Violation::Order { position });
            }
            walk.prev = Some(&node.key);
            walk.position += 1;

            let right = check(node.right(), walk)?;
            let balance = right - left;
            if balance.abs() > 1 {
                return Err(Violation::Unbalanced { position, balance });
            }
            let actual = 1 + left.max(right);
            if node.height != actual {
                return Err(Violation::StaleHeight {
                    position,
                    cached: node.height,
                    actual,
                });
            }
            Ok(actual)
        }

        let mut walk = Walk {
            prev: None,
            position: 0,
        };
        check(self.root(), &mut walk)?;
        if walk.position != self.len {
            return Err(Violation::Count {
                counted: walk.position,
                recorded: self.len,
            });
        }
        Ok(())
    }

    /// Whether every invariant holds. See [`AvlTree::validate`].
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

impl<K, V> Default for AvlTree<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Drop for AvlTree<K, V> {
    fn drop(&mut self) {
        node::release(&mut self.root);
    }
}

impl<K: Clone, V: Clone> Clone for AvlTree<K, V> {
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
            len: self.len,
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for AvlTree<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for AvlTree<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<K: Ord, V> Extend<(K, V)> for AvlTree<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<'a, K, V> IntoIterator for &'a AvlTree<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// =============================================================================
// Entry
// =============================================================================

/// Result of [`AvlTree::entry`]: the existing node, or the insertion point.
pub enum Entry<'a, K, V> {
    Occupied(OccupiedEntry<'a, K, V>),
    Vacant(VacantEntry<'a, K, V>),
}

impl<'a, K: Ord, V> Entry<'a, K, V> {
    pub fn key(&self) -> &K {
        match self {
            Entry::Occupied(e) => e.key(),
            Entry::Vacant(e) => e.key(),
        }
    }

    /// Run `f` on the value if the key is present.
    pub fn and_modify<F: FnOnce(&mut V)>(mut self, f: F) -> Self {
        if let Entry::Occupied(e) = &mut self {
            f(e.get_mut());
        }
        self
    }

    /// Insert `value` if the key is absent. Existing values are left alone.
    pub fn or_insert(self, value: V) {
        if let Entry::Vacant(e) = self {
            e.insert(value);
        }
    }
}

/// A key that is present in the tree.
pub struct OccupiedEntry<'a, K, V> {
    node: &'a mut Node<K, V>,
}

impl<'a, K, V> OccupiedEntry<'a, K, V> {
    pub fn key(&self) -> &K {
        &self.node.key
    }

    pub fn get(&self) -> &V {
        &self.node.value
    }

    pub fn get_mut(&mut self) -> &mut V {
        &mut self.node.value
    }

    pub fn into_mut(self) -> &'a mut V {
        &mut self.node.value
    }

    /// Replace the value, returning the old one.
    pub fn insert(&mut self, value: V) -> V {
        std::mem::replace(&mut self.node.value, value)
    }

    pub fn node(&self) -> &Node<K, V> {
        self.node
    }
}

/// The empty slot a missing key would occupy.
///
/// Inserting goes through the balancing insert path, so rotations along the
/// way are applied as usual.
pub struct VacantEntry<'a, K, V> {
    tree: &'a mut AvlTree<K, V>,
    key: K,
}

impl<'a, K: Ord, V> VacantEntry<'a, K, V> {
    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn into_key(self) -> K {
        self.key
    }

    pub fn insert(self, value: V) {
        let inserted = self.tree.insert_with(self.key, value, |_, _| {});
        debug_assert!(inserted, "vacant entry key was already present");
    }
}

// =============================================================================
// Iteration and display
// =============================================================================

/// In-order iterator returned by [`AvlTree::iter`].
pub struct Iter<'a, K, V> {
    stack: Vec<&'a Node<K, V>>,
    remaining: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    fn push_left_spine(&mut self, mut node: Option<&'a Node<K, V>>) {
        while let Some(n) = node {
            self.stack.push(n);
            node = n.left();
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_left_spine(node.right());
        self.remaining -= 1;
        Some((&node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

/// Display adapter returned by [`AvlTree::pretty`].
pub struct Pretty<'a, K, V> {
    tree: &'a AvlTree<K, V>,
}

impl<K: fmt::Display, V> fmt::Display for Pretty<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut result = Ok(());
        self.tree.visit_reverse(|key, _, level| {
            if result.is_ok() {
                result = writeln!(f, "{:indent$}{}", "", key, indent = 3 * level);
            }
        });
        result
    }
}


#[cfg(test)]
mod proptests;
