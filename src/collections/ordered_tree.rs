//! Height-balanced (AVL) binary search tree keyed by [`Uid`].
//!
//! The tree is write-once: there is no removal. Since uids are handed out in parse
//! order, in-order traversal is declaration order.
use core::{cmp::Ordering, fmt};

use crate::ast::Uid;

/// Anything stored in an [`OrderedTree`].
pub trait Keyed {
    fn key(&self) -> Uid;
}

type Link<T> = Option<Box<Node<T>>>;

#[derive(Clone)]
struct Node<T> {
    value: T,
    height: u32,
    left: Link<T>,
    right: Link<T>,
}

impl<T: Keyed> Node<T> {
    fn leaf(value: T) -> Self {
        Self {
            value,
            height: 1,
            left: None,
            right: None,
        }
    }

    fn update_height(&mut self) {
        self.height = height(&self.left).max(height(&self.right)) + 1;
    }

    fn balance(&self) -> i64 {
        i64::from(height(&self.left)) - i64::from(height(&self.right))
    }
}

fn height<T>(link: &Link<T>) -> u32 {
    link.as_ref().map_or(0, |node| node.height)
}

fn rotate_right<T: Keyed>(mut x: Box<Node<T>>) -> Box<Node<T>> {
    let Some(mut y) = x.left.take() else {
        return x;
    };
    x.left = y.right.take();
    x.update_height();
    y.right = Some(x);
    y.update_height();
    y
}

fn rotate_left<T: Keyed>(mut x: Box<Node<T>>) -> Box<Node<T>> {
    let Some(mut y) = x.right.take() else {
        return x;
    };
    x.right = y.left.take();
    x.update_height();
    y.left = Some(x);
    y.update_height();
    y
}

fn key_of<T: Keyed>(link: &Link<T>) -> Option<Uid> {
    link.as_ref().map(|node| node.value.key())
}

fn insert<T: Keyed>(link: Link<T>, value: T, inserted: &mut bool) -> Box<Node<T>> {
    let Some(mut root) = link else {
        *inserted = true;
        return Box::new(Node::leaf(value));
    };

    let key = value.key();
    match key.cmp(&root.value.key()) {
        Ordering::Less => root.left = Some(insert(root.left.take(), value, inserted)),
        Ordering::Greater => root.right = Some(insert(root.right.take(), value, inserted)),
        // the node already in the tree wins
        Ordering::Equal => return root,
    }

    root.update_height();
    let balance = root.balance();
    let left_key = key_of(&root.left);
    let right_key = key_of(&root.right);

    match (balance, left_key, right_key) {
        // left-left
        (b, Some(lk), _) if b > 1 && key < lk => rotate_right(root),
        // right-right
        (b, _, Some(rk)) if b < -1 && key > rk => rotate_left(root),
        // left-right
        (b, Some(lk), _) if b > 1 && key > lk => {
            root.left = root.left.take().map(rotate_left);
            rotate_right(root)
        }
        // right-left
        (b, _, Some(rk)) if b < -1 && key < rk => {
            root.right = root.right.take().map(rotate_right);
            rotate_left(root)
        }
        _ => root,
    }
}

/// A set of [`Keyed`] values kept in ascending key order.
#[derive(Clone)]
pub struct OrderedTree<T> {
    root: Link<T>,
    len: usize,
}

impl<T> Default for OrderedTree<T> {
    fn default() -> Self {
        Self { root: None, len: 0 }
    }
}

impl<T: Keyed> OrderedTree<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn height(&self) -> u32 {
        height(&self.root)
    }

    /// Inserts `value`, rebalancing on the way back up. Returns `false`, dropping
    /// `value`, if a node with the same key is already present.
    pub fn insert(&mut self, value: T) -> bool {
        let mut inserted = false;
        self.root = Some(insert(self.root.take(), value, &mut inserted));
        if inserted {
            self.len += 1;
        }
        inserted
    }

    pub fn get(&self, key: Uid) -> Option<&T> {
        let mut link = &self.root;
        while let Some(node) = link {
            match key.cmp(&node.value.key()) {
                Ordering::Less => link = &node.left,
                Ordering::Greater => link = &node.right,
                Ordering::Equal => return Some(&node.value),
            }
        }
        None
    }

    /// In-order (ascending key) iterator.
    pub fn iter(&self) -> Iter<'_, T> {
        let mut iter = Iter { stack: vec![] };
        iter.push_left(&self.root);
        iter
    }

    pub fn keys(&self) -> impl Iterator<Item = Uid> + '_ {
        self.iter().map(Keyed::key)
    }

    /// Visits every value in ascending key order, stopping at the first error.
    pub fn try_for_each_mut<E>(
        &mut self,
        mut f: impl FnMut(&mut T) -> Result<(), E>,
    ) -> Result<(), E> {
        fn walk<T, E>(
            link: &mut Link<T>,
            f: &mut impl FnMut(&mut T) -> Result<(), E>,
        ) -> Result<(), E> {
            if let Some(node) = link {
                walk(&mut node.left, &mut *f)?;
                f(&mut node.value)?;
                walk(&mut node.right, &mut *f)?;
            }
            Ok(())
        }
        walk(&mut self.root, &mut f)
    }
}

impl<T: Keyed> FromIterator<T> for OrderedTree<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut tree = Self::new();
        for value in iter {
            tree.insert(value);
        }
        tree
    }
}

impl<T: Keyed + fmt::Debug> fmt::Debug for OrderedTree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'a, T: Keyed> IntoIterator for &'a OrderedTree<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub struct Iter<'a, T> {
    stack: Vec<&'a Node<T>>,
}

impl<'a, T> Iter<'a, T> {
    fn push_left(&mut self, mut link: &'a Link<T>) {
        while let Some(node) = link {
            self.stack.push(node);
            link = &node.left;
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_left(&node.right);
        Some(&node.value)
    }
}
