//! Label interning backed by a height-balanced binary search tree.
//!
//! Every operation label seen in an execution is interned once into a
//! [`LabelRegistry`] and is addressed from then on by a [`NodeId`]. The
//! registry is an AVL tree laid out in an arena: tree links are indices into
//! the same vector that owns the labels, so a node's identity is simply its
//! insertion index.
//!
//! Insertion follows Knuth's Algorithm A (balanced tree search and
//! insertion): a single downward pass records the deepest node with a
//! non-zero balance factor, and at most one single or double rotation at that
//! node restores the AVL property. Lookup and insertion are `O(log n)` for any
//! label arrival order.
//!
//! [`LabelRegistry::traversal`] enumerates the nodes in tree order. This is
//! the enumeration the sorters use to seed their zero in-degree queues, so it
//! is the only source of tie-breaking between independent nodes. Tree order is
//! an in-order walk, which coincides with byte-wise label order.

use alloc::string::String;
use alloc::vec::Vec;
use core::cmp::Ordering;
use core::fmt;

/// Stable identity of an interned label.
///
/// Identities are dense: the `n`-th distinct label interned gets index `n`.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// Index of this node in every per-node arena.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

impl Side {
    const fn weight(self) -> i8 {
        match self {
            Self::Left => -1,
            Self::Right => 1,
        }
    }

    const fn opposite(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    label: String,
    left: Option<NodeId>,
    right: Option<NodeId>,
    /// Height of the right subtree minus height of the left subtree.
    balance: i8,
}

/// Interns labels to [`NodeId`]s.
#[derive(Debug, Default, Clone)]
pub struct LabelRegistry {
    entries: Vec<Entry>,
    root: Option<NodeId>,
}

impl LabelRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of interned labels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The label interned as `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not produced by this registry.
    #[must_use]
    pub fn label(&self, id: NodeId) -> &str {
        &self.entries[id.0].label
    }

    /// Looks up `label` without inserting it.
    #[must_use]
    pub fn get(&self, label: &str) -> Option<NodeId> {
        let mut cursor = self.root;
        while let Some(id) = cursor {
            cursor = match label.cmp(self.label(id)) {
                Ordering::Equal => return Some(id),
                Ordering::Less => self.entries[id.0].left,
                Ordering::Greater => self.entries[id.0].right,
            };
        }
        None
    }

    /// Returns the node for `label`, creating it on first sight.
    pub fn intern(&mut self, label: &str) -> NodeId {
        let Some(root) = self.root else {
            let id = self.push(label);
            self.root = Some(id);
            return id;
        };

        // A1: the pivot is the deepest node on the search path with a
        // non-zero balance factor, the only place a rotation may be needed.
        let mut parent_of_pivot: Option<NodeId> = None;
        let mut pivot = root;
        let mut cursor = root;

        let inserted = loop {
            let side = match label.cmp(self.label(cursor)) {
                Ordering::Equal => return cursor,
                Ordering::Less => Side::Left,
                Ordering::Greater => Side::Right,
            };
            match self.child(cursor, side) {
                Some(next) => {
                    if self.entries[next.0].balance != 0 {
                        parent_of_pivot = Some(cursor);
                        pivot = next;
                    }
                    cursor = next;
                }
                None => {
                    let id = self.push(label);
                    self.set_child(cursor, side, Some(id));
                    break id;
                }
            }
        };

        // A6: every node strictly between the pivot and the new leaf had a
        // zero balance factor and now leans towards the leaf.
        let side = self.side_towards(pivot, label);
        let Some(heavy) = self.child(pivot, side) else {
            unreachable!("inserted leaf lies below the rebalancing point");
        };
        let mut cursor = heavy;
        while cursor != inserted {
            let towards = self.side_towards(cursor, label);
            self.entries[cursor.0].balance = towards.weight();
            let Some(next) = self.child(cursor, towards) else {
                unreachable!("search path leads to the inserted leaf");
            };
            cursor = next;
        }

        // A7: the tree got more balanced, or only one level deeper.
        let weight = side.weight();
        let pivot_balance = self.entries[pivot.0].balance;
        if pivot_balance == 0 || pivot_balance == -weight {
            self.entries[pivot.0].balance += weight;
            return inserted;
        }

        let subtree_root = if self.entries[heavy.0].balance == weight {
            self.rotate_single(pivot, heavy, side)
        } else {
            self.rotate_double(pivot, heavy, side)
        };

        // A10
        match parent_of_pivot {
            None => self.root = Some(subtree_root),
            Some(parent) => {
                let side = if self.entries[parent.0].right == Some(pivot) {
                    Side::Right
                } else {
                    Side::Left
                };
                self.set_child(parent, side, Some(subtree_root));
            }
        }
        inserted
    }

    /// A8: single rotation of `heavy` over `pivot`; returns the new subtree root.
    fn rotate_single(&mut self, pivot: NodeId, heavy: NodeId, side: Side) -> NodeId {
        let inner = self.child(heavy, side.opposite());
        self.set_child(pivot, side, inner);
        self.set_child(heavy, side.opposite(), Some(pivot));
        self.entries[pivot.0].balance = 0;
        self.entries[heavy.0].balance = 0;
        heavy
    }

    /// A9: double rotation through the inner grandchild of `pivot`.
    fn rotate_double(&mut self, pivot: NodeId, heavy: NodeId, side: Side) -> NodeId {
        let Some(middle) = self.child(heavy, side.opposite()) else {
            unreachable!("double rotation requires an inner grandchild");
        };
        let towards_heavy = self.child(middle, side);
        let towards_pivot = self.child(middle, side.opposite());
        self.set_child(heavy, side.opposite(), towards_heavy);
        self.set_child(middle, side, Some(heavy));
        self.set_child(pivot, side, towards_pivot);
        self.set_child(middle, side.opposite(), Some(pivot));

        let weight = side.weight();
        let middle_balance = self.entries[middle.0].balance;
        self.entries[pivot.0].balance = if middle_balance == weight { -weight } else { 0 };
        self.entries[heavy.0].balance = if middle_balance == -weight { weight } else { 0 };
        self.entries[middle.0].balance = 0;
        middle
    }

    fn push(&mut self, label: &str) -> NodeId {
        let id = NodeId(self.entries.len());
        self.entries.push(Entry {
            label: label.into(),
            left: None,
            right: None,
            balance: 0,
        });
        id
    }

    fn side_towards(&self, id: NodeId, label: &str) -> Side {
        if label < self.label(id) {
            Side::Left
        } else {
            Side::Right
        }
    }

    fn child(&self, id: NodeId, side: Side) -> Option<NodeId> {
        let entry = &self.entries[id.0];
        match side {
            Side::Left => entry.left,
            Side::Right => entry.right,
        }
    }

    fn set_child(&mut self, id: NodeId, side: Side, child: Option<NodeId>) {
        let entry = &mut self.entries[id.0];
        match side {
            Side::Left => entry.left = child,
            Side::Right => entry.right = child,
        }
    }

    /// Iterates over all nodes in tree order.
    #[must_use]
    pub fn iter(&self) -> TreeOrder<'_> {
        let mut walk = TreeOrder {
            registry: self,
            stack: Vec::new(),
        };
        walk.descend(self.root);
        walk
    }

    /// All nodes in tree order, the default tie-break enumeration.
    #[must_use]
    pub fn traversal(&self) -> Vec<NodeId> {
        self.iter().collect()
    }
}

/// In-order walk over a [`LabelRegistry`] with an explicit stack.
#[derive(Debug)]
pub struct TreeOrder<'a> {
    registry: &'a LabelRegistry,
    stack: Vec<NodeId>,
}

impl TreeOrder<'_> {
    fn descend(&mut self, mut cursor: Option<NodeId>) {
        while let Some(id) = cursor {
            self.stack.push(id);
            cursor = self.registry.entries[id.0].left;
        }
    }
}

impl Iterator for TreeOrder<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        self.descend(self.registry.entries[id.0].right);
        Some(id)
    }
}
