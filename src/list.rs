use std::fmt;
use std::marker::PhantomData;
use std::ptr::{self, NonNull};

use crate::error::{Error, Result};

/// A singly-linked list that owns its nodes from head to tail.
///
/// Pushing at either end and popping at the head are O(1). Popping at the
/// tail walks the chain to find the new last node, so it is O(n), and so is
/// [`List::len`].
pub struct List<T> {
    head: Link<T>,
    // Alias of the last node in `head`'s chain, null when empty. Never freed through.
    tail: Link<T>,
    _marker: PhantomData<Box<Node<T>>>,
}

// Every non-null link comes from `Box::into_raw` and is freed exactly once,
// by `Box::from_raw` in a pop or in `clear`.
type Link<T> = *mut Node<T>;

struct Node<T> {
    elem: T,
    next: Link<T>,
}

// SAFETY: the list uniquely owns every node reachable from `head`. `tail`
// aliases one of those nodes and is only dereferenced through `&self` or
// `&mut self`, so sending or sharing the list is sending or sharing its `T`s.
unsafe impl<T: Send> Send for List<T> {}
unsafe impl<T: Sync> Sync for List<T> {}

impl<T> List<T> {
    pub fn new() -> Self {
        List {
            head: ptr::null_mut(),
            tail: ptr::null_mut(),
            _marker: PhantomData,
        }
    }

    pub fn push_head(&mut self, elem: T) {
        let node = Box::into_raw(Box::new(Node {
            elem,
            next: self.head,
        }));

        if self.tail.is_null() {
            self.tail = node;
        }

        self.head = node;
    }

    pub fn push_tail(&mut self, elem: T) {
        let node = Box::into_raw(Box::new(Node {
            elem,
            next: ptr::null_mut(),
        }));

        if self.tail.is_null() {
            self.head = node;
        } else {
            // SAFETY: a non-null tail is a live node of this list, and
            // `&mut self` rules out any outstanding borrow of it.
            unsafe {
                (*self.tail).next = node;
            }
        }

        self.tail = node;
    }

    /// Removes the first element, or returns `None` if the list is empty.
    pub fn pop_head(&mut self) -> Option<T> {
        let node = NonNull::new(self.head)?;
        // SAFETY: `head` came from `Box::into_raw` and is unlinked right
        // below, so this is the only place that frees it.
        let boxed = unsafe { Box::from_raw(node.as_ptr()) };
        self.head = boxed.next;

        if self.head.is_null() {
            self.tail = ptr::null_mut();
        }

        Some(boxed.elem)
    }

    /// Removes the last element, or returns `None` if the list is empty.
    ///
    /// Nodes only link forward, so this walks from the head to find the node
    /// that becomes the new tail.
    pub fn pop_tail(&mut self) -> Option<T> {
        let old_tail = NonNull::new(self.tail)?;

        if self.head == self.tail {
            self.head = ptr::null_mut();
            self.tail = ptr::null_mut();
        } else {
            let mut cur = self.head;
            // SAFETY: with two or more nodes the chain from `head` is live and
            // reaches `tail`, so every `cur` visited here is a live node.
            unsafe {
                while (*cur).next != self.tail {
                    cur = (*cur).next;
                }
                (*cur).next = ptr::null_mut();
            }
            self.tail = cur;
        }

        // SAFETY: the old tail is no longer reachable from the list.
        let boxed = unsafe { Box::from_raw(old_tail.as_ptr()) };
        Some(boxed.elem)
    }

    pub fn try_pop_head(&mut self) -> Result<T> {
        self.pop_head().ok_or(Error::Empty)
    }

    pub fn try_pop_tail(&mut self) -> Result<T> {
        self.pop_tail().ok_or(Error::Empty)
    }

    pub fn head(&self) -> Option<&T> {
        // SAFETY: `head` is null or a live node; the borrow is tied to `&self`.
        unsafe { self.head.as_ref() }.map(|node| &node.elem)
    }

    pub fn head_mut(&mut self) -> Option<&mut T> {
        // SAFETY: as in `head`, and `&mut self` makes the borrow unique.
        unsafe { self.head.as_mut() }.map(|node| &mut node.elem)
    }

    pub fn tail(&self) -> Option<&T> {
        // SAFETY: `tail` is null or a live node; the borrow is tied to `&self`.
        unsafe { self.tail.as_ref() }.map(|node| &node.elem)
    }

    pub fn tail_mut(&mut self) -> Option<&mut T> {
        // SAFETY: as in `tail`, and `&mut self` makes the borrow unique.
        unsafe { self.tail.as_mut() }.map(|node| &mut node.elem)
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_null()
    }

    /// Counts the nodes by walking the whole chain.
    pub fn len(&self) -> usize {
        self.elems().count()
    }

    /// Frees every node, head first.
    pub fn clear(&mut self) {
        let mut freed = 0usize;
        // Detach first: if an element's drop panics, the rest leak instead of
        // being freed twice.
        let mut cur = std::mem::replace(&mut self.head, ptr::null_mut());
        self.tail = ptr::null_mut();

        while let Some(node) = NonNull::new(cur) {
            // SAFETY: each node in the detached chain is freed exactly once.
            let boxed = unsafe { Box::from_raw(node.as_ptr()) };
            cur = boxed.next;
            freed += 1;
        }

        if freed > 0 {
            log::trace!("cleared list, freed {} nodes", freed);
        }
    }

    pub(crate) fn elems(&self) -> Elems<'_, T> {
        Elems {
            next: self.head.cast_const(),
            _marker: PhantomData,
        }
    }
}

impl<T> Drop for List<T> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<T> Default for List<T> {
    fn default() -> Self {
        List::new()
    }
}

impl<T: Clone> Clone for List<T> {
    fn clone(&self) -> Self {
        let mut list = List::new();
        for elem in self.elems() {
            list.push_tail(elem.clone());
        }
        list
    }
}

impl<T: fmt::Debug> fmt::Debug for List<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.elems()).finish()
    }
}

impl<T: PartialEq> PartialEq for List<T> {
    fn eq(&self, other: &Self) -> bool {
        self.elems().eq(other.elems())
    }
}

impl<T: Eq> Eq for List<T> {}

// Head-to-tail walk used by the trait impls above; not part of the public API.
pub(crate) struct Elems<'a, T> {
    next: *const Node<T>,
    _marker: PhantomData<&'a T>,
}

impl<'a, T> Iterator for Elems<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        // SAFETY: the walk borrows the list for `'a`, so every node it reaches
        // stays alive and unmodified for that long.
        unsafe { self.next.as_ref() }.map(|node| {
            self.next = node.next.cast_const();
            &node.elem
        })
    }
}


// Paths where the tail pointer aliases a node reached from the head. Kept
// small so they run under `cargo miri test`.
#[cfg(test)]
mod aliasing_tests {
    use super::*;

    #[test]
    fn test_push_head_then_push_tail() {
        let mut list = List::new();
        list.push_head(1);
        list.push_tail(2);

        assert_eq!(list.tail(), Some(&2));
        assert_eq!(list.pop_tail(), Some(2));
        assert_eq!(list.pop_tail(), Some(1));
        assert_eq!(list.pop_tail(), None);
    }

    #[test]
    fn test_push_tail_then_tail_mut() {
        let mut list = List::new();
        list.push_tail(1);
        list.push_tail(2);

        if let Some(elem) = list.tail_mut() {
            *elem += 40;
        }
        if let Some(elem) = list.head_mut() {
            *elem += 10;
        }

        assert_eq!(list.tail(), Some(&42));
        assert_eq!(format!("{:?}", list), "[11, 42]");
    }

    #[test]
    fn test_pop_tail_then_push_tail() {
        let mut list = List::new();
        list.push_tail(String::from("a"));
        list.push_tail(String::from("b"));
        list.push_tail(String::from("c"));

        assert_eq!(list.pop_tail().as_deref(), Some("c"));
        list.push_tail(String::from("d"));
        assert_eq!(list.pop_tail().as_deref(), Some("d"));
        assert_eq!(list.pop_tail().as_deref(), Some("b"));
        list.push_tail(String::from("e"));

        assert_eq!(list.head().map(String::as_str), Some("a"));
        assert_eq!(list.tail().map(String::as_str), Some("e"));
    }

    #[test]
    fn test_clone_then_push_both() {
        let mut list = List::new();
        list.push_head(2);
        list.push_head(1);

        let mut copy = list.clone();
        copy.push_tail(3);
        list.push_tail(4);

        assert_eq!(format!("{:?}", copy), "[1, 2, 3]");
        assert_eq!(format!("{:?}", list), "[1, 2, 4]");
    }

    #[test]
    fn test_pop_head_to_single_then_push_tail() {
        let mut list = List::new();
        list.push_tail(1);
        list.push_tail(2);

        assert_eq!(list.pop_head(), Some(1));
        list.push_tail(3);

        assert_eq!(list.pop_tail(), Some(3));
        assert_eq!(list.pop_tail(), Some(2));
        assert!(list.is_empty());
    }
}
