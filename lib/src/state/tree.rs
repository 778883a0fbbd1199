use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

type Link<K, V> = Option<Rc<Node<K, V>>>;

/// An immutable AVL tree.
///
/// [`Tree::insert`] copies only the path from the root to the inserted key
/// and shares every other node with the original tree, so both versions
/// remain usable and cloning is O(1).
pub(crate) struct Tree<K, V> {
    root: Link<K, V>,
}

struct Node<K, V> {
    key: K,
    value: V,
    height: u8,
    left: Link<K, V>,
    right: Link<K, V>,
}

impl<K, V> Tree<K, V>
where
    K: Ord + Clone,
    V: Clone,
{
    pub fn new() -> Self {
        Self { root: None }
    }

    /// Returns the value associated to `key`.
    pub fn get(&self, key: &K) -> Option<&V> {
        let mut link = &self.root;
        while let Some(node) = link {
            link = match key.cmp(&node.key) {
                Ordering::Less => &node.left,
                Ordering::Greater => &node.right,
                Ordering::Equal => return Some(&node.value),
            };
        }
        None
    }

    /// Returns a new tree where `key` is associated to `value`, replacing
    /// the previous value if the key already existed.
    pub fn insert(&self, key: K, value: V) -> Self {
        Self { root: Some(insert(&self.root, key, value)) }
    }

    /// Iterates the (key, value) pairs in ascending key order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        let mut iter = Iter { stack: Vec::new() };
        iter.push_left(&self.root);
        iter
    }

    #[cfg(test)]
    fn height(&self) -> u8 {
        height(&self.root)
    }
}

fn height<K, V>(link: &Link<K, V>) -> u8 {
    link.as_ref().map_or(0, |node| node.height)
}

fn node<K, V>(
    key: K,
    value: V,
    left: Link<K, V>,
    right: Link<K, V>,
) -> Rc<Node<K, V>> {
    let height = height(&left).max(height(&right)) + 1;
    Rc::new(Node { key, value, height, left, right })
}

fn insert<K, V>(link: &Link<K, V>, key: K, value: V) -> Rc<Node<K, V>>
where
    K: Ord + Clone,
    V: Clone,
{
    let Some(n) = link else {
        return node(key, value, None, None);
    };
    match key.cmp(&n.key) {
        Ordering::Less => balance(
            n.key.clone(),
            n.value.clone(),
            Some(insert(&n.left, key, value)),
            n.right.clone(),
        ),
        Ordering::Greater => balance(
            n.key.clone(),
            n.value.clone(),
            n.left.clone(),
            Some(insert(&n.right, key, value)),
        ),
        Ordering::Equal => {
            node(key, value, n.left.clone(), n.right.clone())
        }
    }
}

/// Builds a node out of `left` and `right`, rotating when their heights
/// differ by more than one.
fn balance<K, V>(
    key: K,
    value: V,
    left: Link<K, V>,
    right: Link<K, V>,
) -> Rc<Node<K, V>>
where
    K: Clone,
    V: Clone,
{
    let (hl, hr) = (height(&left), height(&right));

    if hl > hr + 1 {
        if let Some(l) = &left {
            if height(&l.left) >= height(&l.right) {
                return node(
                    l.key.clone(),
                    l.value.clone(),
                    l.left.clone(),
                    Some(node(key, value, l.right.clone(), right)),
                );
            }
            if let Some(lr) = &l.right {
                return node(
                    lr.key.clone(),
                    lr.value.clone(),
                    Some(node(
                        l.key.clone(),
                        l.value.clone(),
                        l.left.clone(),
                        lr.left.clone(),
                    )),
                    Some(node(key, value, lr.right.clone(), right)),
                );
            }
        }
    } else if hr > hl + 1 {
        if let Some(r) = &right {
            if height(&r.right) >= height(&r.left) {
                return node(
                    r.key.clone(),
                    r.value.clone(),
                    Some(node(key, value, left, r.left.clone())),
                    r.right.clone(),
                );
            }
            if let Some(rl) = &r.left {
                return node(
                    rl.key.clone(),
                    rl.value.clone(),
                    Some(node(key, value, left, rl.left.clone())),
                    Some(node(
                        r.key.clone(),
                        r.value.clone(),
                        rl.right.clone(),
                        r.right.clone(),
                    )),
                );
            }
        }
    }

    node(key, value, left, right)
}

impl<K, V> Clone for Tree<K, V> {
    fn clone(&self) -> Self {
        Self { root: self.root.clone() }
    }
}

impl<K, V> Default for Tree<K, V> {
    fn default() -> Self {
        Self { root: None }
    }
}

impl<K, V> PartialEq for Tree<K, V>
where
    K: Ord + Clone,
    V: Clone + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        let same_root = match (&self.root, &other.root) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        same_root || self.iter().eq(other.iter())
    }
}

impl<K, V> fmt::Debug for Tree<K, V>
where
    K: Ord + Clone + fmt::Debug,
    V: Clone + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// In-order iterator returned by [`Tree::iter`].
pub(crate) struct Iter<'a, K, V> {
    stack: Vec<&'a Node<K, V>>,
}

impl<'a, K, V> Iter<'a, K, V> {
    fn push_left(&mut self, mut link: &'a Link<K, V>) {
        while let Some(node) = link {
            self.stack.push(node);
            link = &node.left;
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_left(&node.right);
        Some((&node.key, &node.value))
    }
}
