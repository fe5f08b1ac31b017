//! Intrusive doubly linked list over a node arena
//!
//! Nodes live in a `Vec` and refer to their neighbours by index, so callers
//! can hold a [`NodeHandle`] and unlink that node later in O(1) without
//! aliasing mutable references. Slots 0 and 1 are the head and tail
//! sentinels; they are linked at construction and never carry an item.

use std::fmt;

const HEAD: usize = 0;
const TAIL: usize = 1;

/// Stable reference to a live node
///
/// A handle stays valid until its node is removed. After that the slot may
/// be reused, so holders must drop handles of removed nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeHandle(usize);

impl NodeHandle {
    /// Arena index behind this handle
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Node in the arena
struct Node<T> {
    item: Option<T>,
    prev: usize,
    next: usize,
}

/// Doubly linked list with sentinel head and tail
pub struct DoublyLinkedList<T> {
    nodes: Vec<Node<T>>,
    free_list: Vec<usize>,
    len: usize,
}

impl<T> Default for DoublyLinkedList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> DoublyLinkedList<T> {
    /// Create an empty list with linked sentinels
    pub fn new() -> Self {
        Self {
            nodes: vec![
                Node { item: None, prev: HEAD, next: TAIL },
                Node { item: None, prev: HEAD, next: TAIL },
            ],
            free_list: Vec::new(),
            len: 0,
        }
    }

    /// Number of items, sentinels excluded
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the list holds no items
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Insert right after the head sentinel
    pub fn insert_to_head(&mut self, item: T) -> NodeHandle {
        let next = self.nodes[HEAD].next;
        self.link(item, HEAD, next)
    }

    /// Insert right before the tail sentinel
    pub fn insert_to_tail(&mut self, item: T) -> NodeHandle {
        let prev = self.nodes[TAIL].prev;
        self.link(item, prev, TAIL)
    }

    /// Remove and return the item right after the head sentinel
    pub fn delete_from_head(&mut self) -> Option<T> {
        let first = self.nodes[HEAD].next;
        if first == TAIL {
            return None;
        }
        self.unlink(first)
    }

    /// Remove and return the item right before the tail sentinel
    pub fn delete_at_end(&mut self) -> Option<T> {
        let last = self.nodes[TAIL].prev;
        if last == HEAD {
            return None;
        }
        self.unlink(last)
    }

    /// Unlink an arbitrary node in O(1)
    ///
    /// Returns `None` for sentinel or already-removed handles.
    pub fn remove(&mut self, handle: NodeHandle) -> Option<T> {
        if !self.is_live(handle.0) {
            return None;
        }
        self.unlink(handle.0)
    }

    /// Borrow the item behind a handle
    pub fn get(&self, handle: NodeHandle) -> Option<&T> {
        self.nodes.get(handle.0).and_then(|node| node.item.as_ref())
    }

    /// Mutably borrow the item behind a handle
    pub fn get_mut(&mut self, handle: NodeHandle) -> Option<&mut T> {
        self.nodes.get_mut(handle.0).and_then(|node| node.item.as_mut())
    }

    /// Item closest to the head
    pub fn peek_head(&self) -> Option<&T> {
        self.nodes[self.nodes[HEAD].next].item.as_ref()
    }

    /// Item closest to the tail
    pub fn peek_tail(&self) -> Option<&T> {
        self.nodes[self.nodes[TAIL].prev].item.as_ref()
    }

    /// Drop every item, keeping the sentinels
    pub fn clear(&mut self) {
        self.nodes.truncate(2);
        self.nodes[HEAD].next = TAIL;
        self.nodes[TAIL].prev = HEAD;
        self.free_list.clear();
        self.len = 0;
    }

    /// Iterate from head to tail
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            cursor: self.nodes[HEAD].next,
        }
    }

    fn is_live(&self, idx: usize) -> bool {
        idx > TAIL && self.nodes.get(idx).is_some_and(|node| node.item.is_some())
    }

    fn link(&mut self, item: T, prev: usize, next: usize) -> NodeHandle {
        let idx = self.alloc_node(Node { item: Some(item), prev, next });
        self.nodes[prev].next = idx;
        self.nodes[next].prev = idx;
        self.len += 1;
        NodeHandle(idx)
    }

    fn unlink(&mut self, idx: usize) -> Option<T> {
        let (prev, next) = (self.nodes[idx].prev, self.nodes[idx].next);
        self.nodes[prev].next = next;
        self.nodes[next].prev = prev;

        let item = self.nodes[idx].item.take();
        debug_assert!(item.is_some(), "unlinked a node without an item");
        self.free_node(idx);
        self.len -= 1;
        item
    }

    fn alloc_node(&mut self, node: Node<T>) -> usize {
        if let Some(idx) = self.free_list.pop() {
            self.nodes[idx] = node;
            idx
        } else {
            self.nodes.push(node);
            self.nodes.len() - 1
        }
    }

    fn free_node(&mut self, idx: usize) {
        let node = &mut self.nodes[idx];
        node.prev = idx;
        node.next = idx;
        self.free_list.push(idx);
    }
}

/// Head-to-tail iterator over a [`DoublyLinkedList`]
pub struct Iter<'a, T> {
    list: &'a DoublyLinkedList<T>,
    cursor: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor == TAIL {
            return None;
        }
        let node = &self.list.nodes[self.cursor];
        self.cursor = node.next;
        node.item.as_ref()
    }
}

impl<T: fmt::Debug> fmt::Debug for DoublyLinkedList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect<T: Clone>(list: &DoublyLinkedList<T>) -> Vec<T> {
        list.iter().cloned().collect()
    }

    #[test]
    fn test_new_is_empty() {
        let list: DoublyLinkedList<u32> = DoublyLinkedList::new();
        assert!(list.is_empty());
        assert_eq!(list.peek_head(), None);
        assert_eq!(list.peek_tail(), None);
        assert_eq!(list.iter().count(), 0);
    }

    #[test]
    fn test_insert_to_head() {
        let mut list = DoublyLinkedList::new();
        list.insert_to_head(("key1", "value1"));
        list.insert_to_head(("key2", "value2"));

        assert_eq!(list.len(), 2);
        assert_eq!(collect(&list), vec![("key2", "value2"), ("key1", "value1")]);
    }

    #[test]
    fn test_insert_to_tail() {
        let mut list = DoublyLinkedList::new();
        list.insert_to_tail(1);
        list.insert_to_tail(2);
        list.insert_to_head(0);

        assert_eq!(collect(&list), vec![0, 1, 2]);
        assert_eq!(list.peek_head(), Some(&0));
        assert_eq!(list.peek_tail(), Some(&2));
    }

    #[test]
    fn test_delete_from_head() {
        let mut list = DoublyLinkedList::new();
        list.insert_to_tail("a");
        list.insert_to_tail("b");

        assert_eq!(list.delete_from_head(), Some("a"));
        assert_eq!(list.delete_from_head(), Some("b"));
        assert_eq!(list.delete_from_head(), None);
        assert!(list.is_empty());
    }

    #[test]
    fn test_delete_at_end() {
        let mut list = DoublyLinkedList::new();
        list.insert_to_tail("a");
        list.insert_to_tail("b");

        assert_eq!(list.delete_at_end(), Some("b"));
        assert_eq!(list.delete_at_end(), Some("a"));
        assert_eq!(list.delete_at_end(), None);
    }

    #[test]
    fn test_remove_middle_node() {
        let mut list = DoublyLinkedList::new();
        list.insert_to_tail(1);
        let middle = list.insert_to_tail(2);
        list.insert_to_tail(3);

        assert_eq!(list.get(middle), Some(&2));
        assert_eq!(list.remove(middle), Some(2));
        assert_eq!(list.len(), 2);
        assert_eq!(collect(&list), vec![1, 3]);

        // Stale handle
        assert_eq!(list.remove(middle), None);
        assert_eq!(list.get(middle), None);
    }

    #[test]
    fn test_sentinels_are_not_removable() {
        let mut list = DoublyLinkedList::new();
        list.insert_to_tail(1);

        assert_eq!(list.remove(NodeHandle(HEAD)), None);
        assert_eq!(list.remove(NodeHandle(TAIL)), None);
        assert_eq!(list.remove(NodeHandle(99)), None);
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_slots_are_reused() {
        let mut list = DoublyLinkedList::new();
        let a = list.insert_to_head("a");
        list.remove(a);
        let b = list.insert_to_head("b");

        assert_eq!(a.index(), b.index());
        assert_eq!(list.get(b), Some(&"b"));
    }

    #[test]
    fn test_get_mut() {
        let mut list = DoublyLinkedList::new();
        let h = list.insert_to_head(String::from("a"));
        list.get_mut(h).unwrap().push('b');

        assert_eq!(list.peek_head().map(String::as_str), Some("ab"));
    }

    #[test]
    fn test_clear() {
        let mut list = DoublyLinkedList::new();
        list.insert_to_head(1);
        list.insert_to_head(2);
        list.clear();

        assert!(list.is_empty());
        assert_eq!(list.delete_at_end(), None);

        list.insert_to_tail(3);
        assert_eq!(collect(&list), vec![3]);
    }

    #[test]
    fn test_debug_format() {
        let mut list = DoublyLinkedList::new();
        list.insert_to_tail(1);
        list.insert_to_tail(2);
        assert_eq!(format!("{:?}", list), "[1, 2]");
    }
}
