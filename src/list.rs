//! Ordered lists of repeated blocks, mutated in place.
//!
//! There is no diffing pass. The marked element stays in the tree as the
//! rightmost anchor; every entry's root is inserted immediately before it,
//! so backing order and host-tree order are the same by construction and
//! every mutation maintains that equality directly:
//!
//! ```text
//! [entry 0 root] [entry 1 root] ... [entry n-1 root] [placeholder]
//! ```
//!
//! Each entry is a full block with its own context, so removal cascades
//! through the entry's refs and disposers exactly like unmounting a nested
//! block.

use std::cell::RefCell;
use std::cmp::Ordering;
use std::rc::Rc;

use crate::block::{Block, Controller};
use crate::context::{Context, Runtime};
use crate::dom::Node;
use crate::error::{Error, Result};
use crate::refs::{marker_attribute, AnyRef, RefCore};

/// Initial population of a list, realized once the list's marker resolves.
pub enum ListInit<D> {
    /// Start empty.
    Empty,
    /// Spawn `n` entries with no data.
    Count(usize),
    /// Spawn one entry per item.
    Items(Vec<D>),
}

impl<D> Default for ListInit<D> {
    fn default() -> Self {
        ListInit::Empty
    }
}

type EntryBuilder<C, D> = Rc<dyn Fn(&Context, Option<&D>) -> C>;

// =============================================================================
// Backing list
// =============================================================================

struct List<C: Controller, D> {
    id: String,
    runtime: Runtime,
    builder: EntryBuilder<C, D>,
    placeholder: Node,
    entries: RefCell<Vec<Block<C>>>,
}

impl<C: Controller, D> List<C, D> {
    fn new(id: String, runtime: Runtime, builder: EntryBuilder<C, D>, placeholder: Node) -> Self {
        List {
            id,
            runtime,
            builder,
            placeholder,
            entries: RefCell::new(Vec::new()),
        }
    }

    /// Build and mount one entry immediately before `reference`.
    fn spawn(&self, data: Option<&D>, reference: &Node) -> Result<Block<C>> {
        let parent = reference
            .parent()
            .ok_or_else(|| Error::DetachedAnchor(self.id.clone()))?;
        let anchor = self.runtime.new_anchor();
        parent.insert_before(&anchor, Some(reference));

        let builder = self.builder.clone();
        let block = Block::build(&self.runtime, self.runtime.next_block_id(), move |ctx| {
            builder(ctx, data)
        });
        block.mount_at(&anchor)?;
        Ok(block)
    }

    fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    fn controller_at(&self, index: usize) -> Option<Rc<C>> {
        self.entries.borrow().get(index).map(Block::controller)
    }

    fn push(&self, data: Option<&D>) -> Result<Rc<C>> {
        let block = self.spawn(data, &self.placeholder)?;
        let controller = block.controller();
        self.entries.borrow_mut().push(block);
        Ok(controller)
    }

    fn unshift(&self, data: Option<&D>) -> Result<Rc<C>> {
        let reference = match self.entries.borrow().first() {
            Some(first) => first.root()?,
            None => self.placeholder.clone(),
        };
        let block = self.spawn(data, &reference)?;
        let controller = block.controller();
        self.entries.borrow_mut().insert(0, block);
        Ok(controller)
    }

    /// Insert before the entry at `index`; at/after the end appends.
    fn insert(&self, index: usize, data: Option<&D>) -> Result<Rc<C>> {
        if index >= self.len() {
            return self.push(data);
        }
        let reference = self.entries.borrow()[index].root()?;
        let block = self.spawn(data, &reference)?;
        let controller = block.controller();
        self.entries.borrow_mut().insert(index, block);
        Ok(controller)
    }

    /// Replace the entry at `index` with a freshly built one.
    fn set(&self, index: usize, data: Option<&D>) -> Result<Rc<C>> {
        let len = self.len();
        if index >= len {
            return Err(Error::IndexOutOfRange { index, len });
        }
        let reference = self.entries.borrow()[index].root()?;
        let block = self.spawn(data, &reference)?;
        let controller = block.controller();
        let old = std::mem::replace(&mut self.entries.borrow_mut()[index], block);
        old.unmount();
        Ok(controller)
    }

    fn pop(&self) -> Option<Rc<C>> {
        let block = self.entries.borrow_mut().pop()?;
        let controller = block.controller();
        block.unmount();
        Some(controller)
    }

    fn shift(&self) -> Option<Rc<C>> {
        let mut entries = self.entries.borrow_mut();
        if entries.is_empty() {
            return None;
        }
        let block = entries.remove(0);
        drop(entries);
        let controller = block.controller();
        block.unmount();
        Some(controller)
    }

    fn remove_at(&self, index: usize) -> Option<Rc<C>> {
        let mut entries = self.entries.borrow_mut();
        if index >= entries.len() {
            return None;
        }
        let block = entries.remove(index);
        drop(entries);
        let controller = block.controller();
        block.unmount();
        Some(controller)
    }

    fn remove_range(&self, start: usize, count: usize) -> Vec<Rc<C>> {
        let mut entries = self.entries.borrow_mut();
        let len = entries.len();
        if start >= len || count == 0 {
            return Vec::new();
        }
        let end = (start + count).min(len);
        let removed: Vec<Block<C>> = entries.drain(start..end).collect();
        drop(entries);
        removed
            .into_iter()
            .map(|block| {
                let controller = block.controller();
                block.unmount();
                controller
            })
            .collect()
    }

    /// Remove entries matching `pred` (called with pre-removal indices),
    /// up to `limit` matches.
    fn remove_where(
        &self,
        pred: impl Fn(&C, usize) -> bool,
        limit: Option<usize>,
    ) -> Vec<Rc<C>> {
        let snapshot: Vec<Rc<C>> = self.entries.borrow().iter().map(Block::controller).collect();
        let limit = limit.unwrap_or(usize::MAX);

        let mut indices = Vec::new();
        for (index, controller) in snapshot.iter().enumerate() {
            if indices.len() == limit {
                break;
            }
            if pred(controller, index) {
                indices.push(index);
            }
        }

        let mut removed = Vec::with_capacity(indices.len());
        for (offset, index) in indices.into_iter().enumerate() {
            let block = self.entries.borrow_mut().remove(index - offset);
            removed.push(block.controller());
            block.unmount();
        }
        removed
    }

    /// Exchange two entries. Equal or out-of-range indices are a no-op.
    fn swap(&self, a: usize, b: usize) -> Result<()> {
        let len = self.len();
        if a == b || a >= len || b >= len {
            return Ok(());
        }
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };

        let (lo_root, hi_root) = {
            let entries = self.entries.borrow();
            (entries[lo].root()?, entries[hi].root()?)
        };
        let parent = lo_root
            .parent()
            .ok_or_else(|| Error::DetachedAnchor(self.id.clone()))?;

        // The placeholder trails every entry, so hi always has a successor.
        let after_hi = hi_root.next_sibling();
        parent.insert_before(&hi_root, Some(&lo_root));
        parent.insert_before(&lo_root, after_hi.as_ref());

        self.entries.borrow_mut().swap(lo, hi);
        Ok(())
    }

    /// Relocate one entry. Equal or out-of-range indices are a no-op.
    fn move_entry(&self, from: usize, to: usize) -> Result<()> {
        let len = self.len();
        if from == to || from >= len || to >= len {
            return Ok(());
        }

        let moved = {
            let mut entries = self.entries.borrow_mut();
            let block = entries.remove(from);
            entries.insert(to, block);
            entries[to].root()?
        };
        let reference = match self.entries.borrow().get(to + 1) {
            Some(next) => next.root()?,
            None => self.placeholder.clone(),
        };
        let parent = self
            .placeholder
            .parent()
            .ok_or_else(|| Error::DetachedAnchor(self.id.clone()))?;
        parent.insert_before(&moved, Some(&reference));
        Ok(())
    }

    /// Sort entries by controller. Re-threads every root in front of the
    /// placeholder afterwards, so the host tree follows the backing order.
    fn sort(&self, cmp: impl Fn(&C, &C) -> Ordering) -> Result<()> {
        let mut entries = self.entries.take();
        entries.sort_by(|a, b| cmp(&a.controller(), &b.controller()));

        let parent = self
            .placeholder
            .parent()
            .ok_or_else(|| Error::DetachedAnchor(self.id.clone()))?;
        for entry in &entries {
            parent.insert_before(&entry.root()?, Some(&self.placeholder));
        }
        *self.entries.borrow_mut() = entries;
        Ok(())
    }

    fn clear(&self) {
        for block in self.entries.take() {
            block.unmount();
        }
    }

    fn find_index(&self, pred: impl Fn(&C) -> bool) -> Option<usize> {
        let snapshot: Vec<Rc<C>> = self.entries.borrow().iter().map(Block::controller).collect();
        snapshot.iter().position(|controller| pred(controller))
    }

    fn for_each(&self, f: impl Fn(&C, usize)) {
        let snapshot: Vec<Rc<C>> = self.entries.borrow().iter().map(Block::controller).collect();
        for (index, controller) in snapshot.iter().enumerate() {
            f(controller, index);
        }
    }
}

// =============================================================================
// List ref
// =============================================================================

struct ListRefInner<C: Controller, D> {
    core: RefCore,
    runtime: Runtime,
    builder: EntryBuilder<C, D>,
    list: RefCell<Option<List<C, D>>>,
}

/// Ref owning a repeated-block list. Every operation fails with
/// [`Error::NotMounted`] until the marker resolves.
pub struct ListRef<C: Controller, D> {
    inner: Rc<ListRefInner<C, D>>,
}

impl<C: Controller, D> Clone for ListRef<C, D> {
    fn clone(&self) -> Self {
        ListRef {
            inner: self.inner.clone(),
        }
    }
}

impl<C: Controller, D> ListRef<C, D> {
    pub(crate) fn new(id: String, runtime: Runtime, builder: EntryBuilder<C, D>) -> ListRef<C, D> {
        ListRef {
            inner: Rc::new(ListRefInner {
                core: RefCore::new(id),
                runtime,
                builder,
                list: RefCell::new(None),
            }),
        }
    }

    /// Marker attribute to write inside the parent template.
    pub fn marker(&self) -> String {
        marker_attribute(self.inner.core.id())
    }

    pub fn is_mounted(&self) -> bool {
        self.inner.core.is_mounted()
    }

    fn with<R>(&self, f: impl FnOnce(&List<C, D>) -> R) -> Result<R> {
        self.inner.core.require_mounted()?;
        let list = self.inner.list.borrow();
        match list.as_ref() {
            Some(list) => Ok(f(list)),
            None => Err(Error::NotMounted(self.inner.core.id().to_string())),
        }
    }

    /// Append an entry. `item` may be a bare `D` or `None`.
    pub fn push(&self, item: impl Into<Option<D>>) -> Result<Rc<C>> {
        let item = item.into();
        self.with(|list| list.push(item.as_ref()))?
    }

    /// Prepend an entry.
    pub fn unshift(&self, item: impl Into<Option<D>>) -> Result<Rc<C>> {
        let item = item.into();
        self.with(|list| list.unshift(item.as_ref()))?
    }

    /// Insert before the entry at `index`; an index at or past the end
    /// appends.
    pub fn insert(&self, index: usize, item: impl Into<Option<D>>) -> Result<Rc<C>> {
        let item = item.into();
        self.with(|list| list.insert(index, item.as_ref()))?
    }

    /// Replace the entry at `index` with a freshly built one.
    pub fn set(&self, index: usize, item: impl Into<Option<D>>) -> Result<Rc<C>> {
        let item = item.into();
        self.with(|list| list.set(index, item.as_ref()))?
    }

    /// Remove and unmount the last entry.
    pub fn pop(&self) -> Result<Option<Rc<C>>> {
        self.with(List::pop)
    }

    /// Remove and unmount the first entry.
    pub fn shift(&self) -> Result<Option<Rc<C>>> {
        self.with(List::shift)
    }

    /// Remove the entry at `index`; `None` when out of range.
    pub fn remove_at(&self, index: usize) -> Result<Option<Rc<C>>> {
        self.with(|list| list.remove_at(index))
    }

    /// Remove up to `count` entries starting at `start`, clamped to the end.
    pub fn remove_range(&self, start: usize, count: usize) -> Result<Vec<Rc<C>>> {
        self.with(|list| list.remove_range(start, count))
    }

    /// Remove entries matching `pred`; indices passed to `pred` are the
    /// positions before any removal.
    pub fn remove_where(
        &self,
        pred: impl Fn(&C, usize) -> bool,
        limit: Option<usize>,
    ) -> Result<Vec<Rc<C>>> {
        self.with(|list| list.remove_where(pred, limit))
    }

    /// Exchange the entries at `a` and `b`. Equal or out-of-range indices
    /// leave the list untouched.
    pub fn swap(&self, a: usize, b: usize) -> Result<()> {
        self.with(|list| list.swap(a, b))?
    }

    /// Move the entry at `from` so it ends up at index `to`. Equal or
    /// out-of-range indices leave the list untouched.
    pub fn move_entry(&self, from: usize, to: usize) -> Result<()> {
        self.with(|list| list.move_entry(from, to))?
    }

    /// Reorder entries by controller comparison.
    pub fn sort(&self, cmp: impl Fn(&C, &C) -> Ordering) -> Result<()> {
        self.with(|list| list.sort(cmp))?
    }

    /// Remove and unmount every entry.
    pub fn clear(&self) -> Result<()> {
        self.with(List::clear)
    }

    pub fn len(&self) -> Result<usize> {
        self.with(List::len)
    }

    pub fn is_empty(&self) -> Result<bool> {
        self.with(|list| list.len() == 0)
    }

    /// Controller at `index`; `None` when out of range.
    pub fn get(&self, index: usize) -> Result<Option<Rc<C>>> {
        self.with(|list| list.controller_at(index))
    }

    pub fn first(&self) -> Result<Rc<C>> {
        self.with(|list| list.controller_at(0))?.ok_or(Error::Empty)
    }

    pub fn last(&self) -> Result<Rc<C>> {
        self.with(|list| {
            let len = list.len();
            if len == 0 {
                None
            } else {
                list.controller_at(len - 1)
            }
        })?
        .ok_or(Error::Empty)
    }

    /// Index of the first entry matching `pred`.
    pub fn find_index(&self, pred: impl Fn(&C) -> bool) -> Result<Option<usize>> {
        self.with(|list| list.find_index(pred))
    }

    /// Controller of the first entry matching `pred`.
    pub fn find(&self, pred: impl Fn(&C) -> bool) -> Result<Option<Rc<C>>> {
        self.with(|list| {
            list.find_index(&pred)
                .and_then(|index| list.controller_at(index))
        })
    }

    /// Visit every controller with its current index.
    pub fn for_each(&self, f: impl Fn(&C, usize)) -> Result<()> {
        self.with(|list| list.for_each(f))
    }
}

impl<C: Controller, D> AnyRef for ListRef<C, D> {
    fn id(&self) -> String {
        self.inner.core.id().to_string()
    }

    fn mount(&self, node: &Node) -> Result<()> {
        self.inner.core.begin_mount()?;
        *self.inner.list.borrow_mut() = Some(List::new(
            self.inner.core.id().to_string(),
            self.inner.runtime.clone(),
            self.inner.builder.clone(),
            node.clone(),
        ));
        self.inner.core.finish_mount();
        Ok(())
    }

    fn unmount(&self) {
        if !self.inner.core.is_mounted() {
            return;
        }
        if let Some(list) = self.inner.list.borrow_mut().take() {
            list.clear();
        }
        self.inner.core.finish_unmount();
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::render;

    struct Item {
        label: String,
    }

    impl Controller for Item {
        fn template(&self) -> String {
            format!("<li>{}</li>", self.label)
        }
    }

    fn build_item(_ctx: &Context, data: Option<&String>) -> Item {
        Item {
            label: data.cloned().unwrap_or_else(|| "?".to_string()),
        }
    }

    fn setup(items: &[&str]) -> (Node, ListRef<Item, String>) {
        let container = Node::element("div");
        let init = ListInit::Items(items.iter().map(|s| s.to_string()).collect());
        let mut list_ref = None;
        render(&container, |ctx| {
            let list = ctx.list(build_item, init);
            let markup = format!("<ul><span {}></span></ul>", list.marker());
            list_ref = Some(list);
            markup
        })
        .unwrap();
        (container, list_ref.unwrap())
    }

    /// Labels in host-tree order.
    fn dom_order(container: &Node) -> String {
        container.text_content()
    }

    /// Labels in backing order.
    fn backing_order(list: &ListRef<Item, String>) -> String {
        let labels = RefCell::new(String::new());
        list.for_each(|item, _index| labels.borrow_mut().push_str(&item.label))
            .unwrap();
        labels.into_inner()
    }

    #[test]
    fn test_initial_items() {
        let (container, list) = setup(&["a", "b", "c"]);
        assert_eq!(list.len().unwrap(), 3);
        assert_eq!(dom_order(&container), "abc");
        assert_eq!(backing_order(&list), "abc");
    }

    #[test]
    fn test_push_unshift_insert() {
        let (container, list) = setup(&["b"]);
        list.push("d".to_string()).unwrap();
        list.unshift("a".to_string()).unwrap();
        list.insert(2, "c".to_string()).unwrap();
        assert_eq!(dom_order(&container), "abcd");
        assert_eq!(backing_order(&list), "abcd");
    }

    #[test]
    fn test_insert_past_end_appends() {
        let (container, list) = setup(&["a", "b"]);
        list.insert(9, "c".to_string()).unwrap();
        assert_eq!(dom_order(&container), "abc");
        assert_eq!(backing_order(&list), "abc");
        assert_eq!(list.len().unwrap(), 3);
    }

    #[test]
    fn test_push_without_data() {
        let (container, list) = setup(&[]);
        list.push(None).unwrap();
        assert_eq!(dom_order(&container), "?");
        assert_eq!(list.len().unwrap(), 1);
    }

    #[test]
    fn test_set_replaces_in_place() {
        let (container, list) = setup(&["a", "b", "c"]);
        let replaced = list.set(1, "B".to_string()).unwrap();
        assert_eq!(replaced.label, "B");
        assert_eq!(dom_order(&container), "aBc");
        assert_eq!(list.len().unwrap(), 3);
    }

    #[test]
    fn test_pop_shift_remove_at() {
        let (container, list) = setup(&["a", "b", "c", "d"]);
        assert_eq!(list.pop().unwrap().unwrap().label, "d");
        assert_eq!(list.shift().unwrap().unwrap().label, "a");
        assert_eq!(list.remove_at(0).unwrap().unwrap().label, "b");
        assert!(list.remove_at(5).unwrap().is_none());
        assert_eq!(dom_order(&container), "c");

        list.clear().unwrap();
        assert!(list.pop().unwrap().is_none());
        assert!(list.shift().unwrap().is_none());
    }

    #[test]
    fn test_remove_range_clamps() {
        let (container, list) = setup(&["a", "b", "c", "d"]);
        let removed = list.remove_range(2, 10).unwrap();
        assert_eq!(removed.len(), 2);
        assert_eq!(dom_order(&container), "ab");
        assert!(list.remove_range(5, 1).unwrap().is_empty());
    }

    #[test]
    fn test_remove_where_uses_preremoval_indices() {
        let (container, list) = setup(&["a", "b", "c", "d"]);
        let removed = list
            .remove_where(|_item, index| index % 2 == 1, None)
            .unwrap();
        let labels: Vec<&str> = removed.iter().map(|item| item.label.as_str()).collect();
        assert_eq!(labels, ["b", "d"]);
        assert_eq!(dom_order(&container), "ac");
        assert_eq!(backing_order(&list), "ac");
    }

    #[test]
    fn test_remove_where_honors_limit() {
        let (container, list) = setup(&["a", "b", "c"]);
        let removed = list.remove_where(|_item, _index| true, Some(2)).unwrap();
        assert_eq!(removed.len(), 2);
        assert_eq!(dom_order(&container), "c");
    }

    #[test]
    fn test_swap_adjacent_and_distant() {
        let (container, list) = setup(&["a", "b", "c", "d"]);

        list.swap(0, 1).unwrap();
        assert_eq!(dom_order(&container), "bacd");
        assert_eq!(backing_order(&list), "bacd");

        list.swap(3, 0).unwrap();
        assert_eq!(dom_order(&container), "dacb");
        assert_eq!(backing_order(&list), "dacb");

        list.swap(2, 2).unwrap();
        assert_eq!(dom_order(&container), "dacb");
    }

    #[test]
    fn test_swap_out_of_range_is_noop() {
        let (container, list) = setup(&["a", "b"]);
        list.swap(0, 5).unwrap();
        list.swap(7, 1).unwrap();
        assert_eq!(dom_order(&container), "ab");
        assert_eq!(backing_order(&list), "ab");

        let (empty_container, empty) = setup(&[]);
        empty.swap(0, 1).unwrap();
        assert_eq!(dom_order(&empty_container), "");
    }

    #[test]
    fn test_move_out_of_range_is_noop() {
        let (container, list) = setup(&["a", "b"]);
        list.move_entry(0, 5).unwrap();
        list.move_entry(7, 1).unwrap();
        list.move_entry(1, 1).unwrap();
        assert_eq!(dom_order(&container), "ab");
        assert_eq!(backing_order(&list), "ab");

        let (_, empty) = setup(&[]);
        empty.move_entry(0, 0).unwrap();
        assert!(empty.is_empty().unwrap());
    }

    #[test]
    fn test_swap_twice_is_identity() {
        let (container, list) = setup(&["a", "b", "c"]);
        list.swap(0, 2).unwrap();
        list.swap(0, 2).unwrap();
        assert_eq!(dom_order(&container), "abc");
        assert_eq!(backing_order(&list), "abc");
    }

    #[test]
    fn test_move_entry() {
        let (container, list) = setup(&["a", "b", "c", "d"]);

        list.move_entry(0, 2).unwrap();
        assert_eq!(dom_order(&container), "bcad");
        assert_eq!(backing_order(&list), "bcad");

        list.move_entry(3, 0).unwrap();
        assert_eq!(dom_order(&container), "dbca");
        assert_eq!(backing_order(&list), "dbca");
    }

    #[test]
    fn test_sort_and_idempotence() {
        let (container, list) = setup(&["c", "a", "d", "b"]);
        let by_label = |a: &Item, b: &Item| a.label.cmp(&b.label);

        list.sort(by_label).unwrap();
        assert_eq!(dom_order(&container), "abcd");
        assert_eq!(backing_order(&list), "abcd");

        list.sort(by_label).unwrap();
        assert_eq!(dom_order(&container), "abcd");
    }

    #[test]
    fn test_find_and_access() {
        let (_container, list) = setup(&["a", "b", "c"]);
        assert_eq!(list.find_index(|item| item.label == "b").unwrap(), Some(1));
        assert_eq!(
            list.find(|item| item.label == "c").unwrap().unwrap().label,
            "c"
        );
        assert!(list.find(|item| item.label == "z").unwrap().is_none());
        assert_eq!(list.first().unwrap().label, "a");
        assert_eq!(list.last().unwrap().label, "c");
        assert_eq!(list.get(1).unwrap().unwrap().label, "b");
        assert!(list.get(7).unwrap().is_none());
    }

    #[test]
    fn test_empty_list_access() {
        let (_container, list) = setup(&[]);
        assert!(list.is_empty().unwrap());
        assert!(matches!(list.first(), Err(Error::Empty)));
        assert!(matches!(list.last(), Err(Error::Empty)));
    }

    #[test]
    fn test_count_init() {
        let container = Node::element("div");
        let mut list_ref = None;
        render(&container, |ctx| {
            let list: ListRef<Item, String> = ctx.list(build_item, ListInit::Count(3));
            let markup = format!("<ul><span {}></span></ul>", list.marker());
            list_ref = Some(list);
            markup
        })
        .unwrap();
        assert_eq!(dom_order(&container), "???");
        assert_eq!(list_ref.unwrap().len().unwrap(), 3);
    }

    #[test]
    fn test_unresolved_list_errors() {
        let container = Node::element("div");
        let mut list_ref = None;
        render(&container, |ctx| {
            let list: ListRef<Item, String> = ctx.list(build_item, ListInit::Empty);
            list_ref = Some(list);
            "<ul>no marker</ul>"
        })
        .unwrap();
        let list = list_ref.unwrap();
        assert!(matches!(
            list.push("x".to_string()),
            Err(Error::NotMounted(_))
        ));
        assert!(matches!(list.len(), Err(Error::NotMounted(_))));
    }

    #[test]
    fn test_entry_disposers_run_on_removal() {
        use std::cell::Cell;

        let container = Node::element("div");
        let dropped = Rc::new(Cell::new(0));
        let mut list_ref = None;

        let dropped_for_builder = dropped.clone();
        render(&container, |ctx| {
            let list: ListRef<Item, String> = ctx.list(
                move |entry_ctx, data| {
                    let dropped = dropped_for_builder.clone();
                    entry_ctx.on_unmount(move || dropped.set(dropped.get() + 1));
                    build_item(entry_ctx, data)
                },
                ListInit::Items(vec!["a".to_string(), "b".to_string()]),
            );
            let markup = format!("<ul><span {}></span></ul>", list.marker());
            list_ref = Some(list);
            markup
        })
        .unwrap();

        let list = list_ref.unwrap();
        list.pop().unwrap();
        assert_eq!(dropped.get(), 1);
        list.clear().unwrap();
        assert_eq!(dropped.get(), 2);
    }
}
