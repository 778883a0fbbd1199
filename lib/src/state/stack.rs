use std::fmt;
use std::rc::Rc;

/// An immutable singly-linked stack.
///
/// Pushing and popping return a new stack that shares every other frame
/// with the original one, so cloning a [`Stack`] is O(1) and never copies
/// its items.
pub(crate) struct Stack<T> {
    head: Option<Rc<Frame<T>>>,
    len: usize,
}

struct Frame<T> {
    item: T,
    next: Option<Rc<Frame<T>>>,
}

impl<T> Stack<T> {
    /// Creates an empty stack.
    pub fn new() -> Self {
        Self { head: None, len: 0 }
    }

    /// Returns a new stack with `item` on top of the items in this one.
    pub fn push(&self, item: T) -> Self {
        Self {
            head: Some(Rc::new(Frame { item, next: self.head.clone() })),
            len: self.len + 1,
        }
    }

    /// Returns the stack that results from removing the topmost item.
    ///
    /// Popping from an empty stack returns another empty stack.
    pub fn pop(&self) -> Self {
        match &self.head {
            Some(frame) => {
                Self { head: frame.next.clone(), len: self.len - 1 }
            }
            None => Self::new(),
        }
    }

    /// Returns a reference to the topmost item, if any.
    pub fn peek(&self) -> Option<&T> {
        self.head.as_ref().map(|frame| &frame.item)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Iterates the items from top to bottom.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter { next: self.head.as_deref() }
    }
}

impl<T> Clone for Stack<T> {
    fn clone(&self) -> Self {
        Self { head: self.head.clone(), len: self.len }
    }
}

impl<T> Default for Stack<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for Stack<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

// Frames are released iteratively, a long chain of uniquely owned frames
// would otherwise overflow the call stack while being dropped.
impl<T> Drop for Stack<T> {
    fn drop(&mut self) {
        let mut next = self.head.take();
        while let Some(frame) = next {
            match Rc::try_unwrap(frame) {
                Ok(mut frame) => next = frame.next.take(),
                Err(_) => break,
            }
        }
    }
}

/// Iterator returned by [`Stack::iter`].
pub(crate) struct Iter<'a, T> {
    next: Option<&'a Frame<T>>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let frame = self.next?;
        self.next = frame.next.as_deref();
        Some(&frame.item)
    }
}
