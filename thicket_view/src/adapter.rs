// Copyright 2025 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Virtualized containers driven by an adapter.
//!
//! An [`AdapterView`] realizes views only for the items inside its viewport (plus overscan).
//! Views scrolled out are parked in the container's reuse cache and handed back to the
//! [`Adapter`] for the next index that needs one.
//!
//! Item data may be loaded off the UI thread. Each change of the realized range issues a new
//! [`LoadTicket`] and cancels the previous one; loaders poll [`CancelToken::is_cancelled`]
//! and deliver results back on the UI thread through [`AdapterView::complete_load`], which
//! ignores stale tickets.
//!
//! ```rust
//! use kurbo::{Rect, Size};
//! # use thicket_view::{Device, DeviceError, RenderTarget};
//! use thicket_view::{Adapter, AdapterView, Plain, Session, ViewId, Window, WindowConfig};
//!
//! struct Rows(usize);
//!
//! impl Adapter for Rows {
//!     fn count(&self) -> usize {
//!         self.0
//!     }
//!
//!     fn bind_view(
//!         &mut self,
//!         window: &mut Window,
//!         index: usize,
//!         recycled: Option<ViewId>,
//!     ) -> Option<ViewId> {
//!         let view = recycled.unwrap_or_else(|| window.tree_mut().create_element(Plain));
//!         window.tree_mut().element_mut(view)?.set_ident(index as u32);
//!         Some(view)
//!     }
//! }
//! # struct NoDevice;
//! # impl Device for NoDevice {
//! #     fn begin_frame(&mut self) -> Result<&mut dyn RenderTarget, DeviceError> {
//! #         Err(DeviceError::Unavailable)
//! #     }
//! #     fn end_frame(&mut self) -> Result<(), DeviceError> { Ok(()) }
//! #     fn recreate(&mut self) -> Result<(), DeviceError> { Err(DeviceError::Unavailable) }
//! #     fn resize(&mut self, _: Size) -> Result<(), DeviceError> { Ok(()) }
//! #     fn epoch(&self) -> u64 { 0 }
//! # }
//!
//! let mut window = Window::new(
//!     NoDevice,
//!     Session::default(),
//!     Size::new(200.0, 100.0),
//!     WindowConfig::default(),
//! );
//! let root = window.root();
//! let mut list = AdapterView::new(&mut window, root, Rows(1000), 20.0, 0.0).unwrap();
//! list.set_frame(&mut window, Rect::new(0.0, 0.0, 200.0, 100.0));
//!
//! // Only the five rows in view exist.
//! assert_eq!(list.realized().count(), 5);
//! list.scroll_to(&mut window, 400.0);
//! assert_eq!(list.view_at(20).map(|v| window.tree().element(v).unwrap().ident()), Some(20));
//! assert_eq!(list.realized().count(), 5);
//! ```

use alloc::collections::BTreeMap;
use alloc::rc::Rc;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::cell::Cell;
use core::ops::Range;
use core::sync::atomic::{AtomicBool, Ordering};

use kurbo::Rect;
use log::{debug, trace};
use thicket_virtual_list::{ExtentModel, FixedExtentModel, VirtualList};

use crate::{Plain, TreeError, ViewFlags, ViewId, Window};

/// Supplies item views to an [`AdapterView`].
pub trait Adapter {
    /// Number of items.
    fn count(&self) -> usize;

    /// Return the view for `index`, filling `recycled` if one is supplied.
    ///
    /// `None` leaves the index empty.
    fn bind_view(
        &mut self,
        window: &mut Window,
        index: usize,
        recycled: Option<ViewId>,
    ) -> Option<ViewId>;
}

/// Change notifications from a data owner to its adapter views.
///
/// Clones share one version counter.
#[derive(Clone, Debug, Default)]
pub struct DataSetObserver(Rc<Cell<u64>>);

impl DataSetObserver {
    /// A fresh observer.
    pub fn new() -> Self {
        Self::default()
    }

    /// The backing data changed.
    pub fn notify_changed(&self) {
        self.0.set(self.0.get().wrapping_add(1));
    }

    /// Current version.
    pub fn version(&self) -> u64 {
        self.0.get()
    }
}

/// Cancellation flag shared with a loader thread.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// A token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel; every clone observes it.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Whether the load should stop.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// A request to load data for a range of items.
#[derive(Clone, Debug)]
pub struct LoadTicket {
    generation: u64,
    range: Range<usize>,
    cancel: CancelToken,
}

impl LoadTicket {
    /// Monotonic ticket number.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Items to load.
    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    /// Cancellation flag, cloneable into the loader.
    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }
}

/// A vertical virtualized list of fixed-height items.
pub struct AdapterView<A: Adapter> {
    adapter: A,
    container: ViewId,
    list: VirtualList<FixedExtentModel>,
    observer: DataSetObserver,
    seen_version: u64,
    realized: BTreeMap<usize, ViewId>,
    ticket: Option<LoadTicket>,
    generation: u64,
}

impl<A: Adapter> core::fmt::Debug for AdapterView<A> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AdapterView")
            .field("container", &self.container)
            .field("realized", &self.realized.len())
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

impl<A: Adapter> AdapterView<A> {
    /// Create the list's container under `parent`.
    pub fn new(
        window: &mut Window,
        parent: ViewId,
        adapter: A,
        item_extent: f64,
        overscan: f64,
    ) -> Result<Self, TreeError> {
        let container = window.tree_mut().create_layout(Plain);
        window.tree_mut().add_flags(container, ViewFlags::CLIP_VIEW);
        if let Err(err) = window.add_view(parent, container, None) {
            window.tree_mut().destroy(container);
            return Err(err);
        }
        let model = FixedExtentModel::new(adapter.count(), item_extent);
        Ok(Self {
            adapter,
            container,
            list: VirtualList::new(model, 0.0, overscan),
            observer: DataSetObserver::new(),
            seen_version: 0,
            realized: BTreeMap::new(),
            ticket: None,
            generation: 0,
        })
    }

    /// The container view.
    pub fn container(&self) -> ViewId {
        self.container
    }

    /// The adapter.
    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    /// The adapter, mutably. Call [`DataSetObserver::notify_changed`] after changing data.
    pub fn adapter_mut(&mut self) -> &mut A {
        &mut self.adapter
    }

    /// An observer to notify when the adapter's data changes.
    pub fn observer(&self) -> DataSetObserver {
        self.observer.clone()
    }

    /// Realized `(index, view)` pairs in index order.
    pub fn realized(&self) -> impl Iterator<Item = (usize, ViewId)> + '_ {
        self.realized.iter().map(|(i, v)| (*i, *v))
    }

    /// The view realized for `index`.
    pub fn view_at(&self, index: usize) -> Option<ViewId> {
        self.realized.get(&index).copied()
    }

    /// Current scroll offset.
    pub fn scroll_offset(&self) -> f64 {
        self.list.scroll_offset()
    }

    /// The outstanding load request, if any.
    pub fn current_ticket(&self) -> Option<&LoadTicket> {
        self.ticket.as_ref()
    }

    /// Place the container and size the viewport to it.
    pub fn set_frame(&mut self, window: &mut Window, frame: Rect) -> Option<LoadTicket> {
        window.tree_mut().set_layout_info(
            self.container,
            frame.x0,
            frame.y0,
            frame.width(),
            frame.height(),
        );
        let height = window
            .tree()
            .element(self.container)
            .map_or(0.0, |e| e.layout().height());
        self.list.set_viewport_extent(height);
        self.refresh(window)
    }

    /// Scroll to an absolute offset (clamped to the content).
    pub fn scroll_to(&mut self, window: &mut Window, offset: f64) -> Option<LoadTicket> {
        self.list.set_scroll_offset(offset);
        self.refresh(window)
    }

    /// Scroll by a delta.
    pub fn scroll_by(&mut self, window: &mut Window, delta: f64) -> Option<LoadTicket> {
        self.list.scroll_by(delta);
        self.refresh(window)
    }

    /// Bring realized views in line with the data and the viewport.
    ///
    /// Returns a new load ticket when the realized range changed.
    pub fn refresh(&mut self, window: &mut Window) -> Option<LoadTicket> {
        let version = self.observer.version();
        let data_changed = version != self.seen_version;
        self.seen_version = version;
        let range = self.sync(window, data_changed);

        let changed = self.ticket.as_ref().is_none_or(|t| t.range != range);
        if !changed && !data_changed {
            return None;
        }
        if let Some(old) = self.ticket.take() {
            old.cancel.cancel();
        }
        self.generation += 1;
        let ticket = LoadTicket {
            generation: self.generation,
            range,
            cancel: CancelToken::new(),
        };
        self.ticket = Some(ticket.clone());
        Some(ticket)
    }

    /// Realize the visible range, binding every index again when `rebind` is set.
    fn sync(&mut self, window: &mut Window, rebind: bool) -> Range<usize> {
        if rebind {
            self.list.model_mut().set_len(self.adapter.count());
            self.list.invalidate();
        }
        let range = self.list.visible_range();

        let leaving: Vec<usize> = self
            .realized
            .keys()
            .copied()
            .filter(|i| !range.contains(*i))
            .collect();
        for index in leaving {
            if let Some(view) = self.realized.remove(&index) {
                trace!("recycling row {index} ({view:?})");
                self.recycle(window, view);
            }
        }

        for index in range.indices() {
            let current = self.realized.get(&index).copied();
            if current.is_some() && !rebind {
                continue;
            }
            let recycled = current.or_else(|| {
                window
                    .tree()
                    .cached_children(self.container)
                    .first()
                    .copied()
            });
            let bound = self
                .adapter
                .bind_view(window, index, recycled)
                .filter(|view| self.attach(window, *view));
            match bound {
                Some(view) => {
                    if let Some(old) = current.filter(|old| *old != view) {
                        self.recycle(window, old);
                    }
                    self.realized.insert(index, view);
                }
                None => {
                    if let Some(old) = self.realized.remove(&index) {
                        self.recycle(window, old);
                    }
                }
            }
        }

        self.position(window);
        range.indices()
    }

    /// Make `view` a child of the container. Returns `false` if the tree refused it.
    fn attach(&self, window: &mut Window, view: ViewId) -> bool {
        if window.tree().parent_of(view) == Some(self.container) {
            return true;
        }
        match window.add_view(self.container, view, None) {
            Ok(()) => true,
            Err(err) => {
                debug!("adapter returned {view:?}, which cannot be a row: {err}");
                false
            }
        }
    }

    /// Park `view` in the container's reuse cache.
    fn recycle(&self, window: &mut Window, view: ViewId) {
        // The adapter may have destroyed or moved the view itself.
        if let Err(err) = window.remove_child(self.container, view, true) {
            debug!("could not recycle {view:?}: {err}");
        }
    }

    fn position(&self, window: &mut Window) {
        let width = window
            .tree()
            .element(self.container)
            .map_or(0.0, |e| e.layout().width());
        let model = self.list.model();
        let scroll = self.list.scroll_offset();
        for (&index, &view) in &self.realized {
            let y = model.offset_of(index) - scroll;
            window
                .tree_mut()
                .set_layout_info(view, 0.0, y, width, model.extent_of(index));
            window.invalidate_view(view);
        }
    }

    /// Accept the result of a load.
    ///
    /// Stale or cancelled tickets are ignored and return `false`. Otherwise `apply` updates
    /// the adapter's data and the realized views are bound again; the ticket stays current.
    pub fn complete_load(
        &mut self,
        window: &mut Window,
        ticket: &LoadTicket,
        apply: impl FnOnce(&mut A),
    ) -> bool {
        let current = self
            .ticket
            .as_ref()
            .is_some_and(|t| t.generation == ticket.generation && !t.cancel.is_cancelled());
        if !current {
            trace!("dropping stale load {}", ticket.generation);
            return false;
        }
        apply(&mut self.adapter);
        self.sync(window, true);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingDevice;
    use crate::{Session, WindowConfig};
    use alloc::vec;
    use kurbo::Size;

    #[derive(Default)]
    struct Rows {
        labels: Vec<u32>,
        created: usize,
        recycled: usize,
    }

    impl Adapter for Rows {
        fn count(&self) -> usize {
            self.labels.len()
        }

        fn bind_view(
            &mut self,
            window: &mut Window,
            index: usize,
            recycled: Option<ViewId>,
        ) -> Option<ViewId> {
            let view = match recycled {
                Some(v) => {
                    self.recycled += 1;
                    v
                }
                None => {
                    self.created += 1;
                    window.tree_mut().create_element(Plain)
                }
            };
            window
                .tree_mut()
                .element_mut(view)?
                .set_ident(*self.labels.get(index)?);
            Some(view)
        }
    }

    fn setup(rows: u32) -> (Window, AdapterView<Rows>) {
        let (device, _) = RecordingDevice::new();
        let mut window = Window::new(
            device,
            Session::default(),
            Size::new(100.0, 100.0),
            WindowConfig::default(),
        );
        let adapter = Rows {
            labels: (0..rows).collect(),
            ..Rows::default()
        };
        let root = window.root();
        let mut list = AdapterView::new(&mut window, root, adapter, 20.0, 0.0).unwrap();
        list.set_frame(&mut window, Rect::new(0.0, 0.0, 100.0, 100.0));
        (window, list)
    }

    fn idents(window: &Window, list: &AdapterView<Rows>) -> Vec<(usize, u32)> {
        list.realized()
            .map(|(i, v)| (i, window.tree().element(v).unwrap().ident()))
            .collect()
    }

    #[test]
    fn realizes_only_visible_rows() {
        let (window, list) = setup(100);
        assert_eq!(
            idents(&window, &list),
            vec![(0, 0), (1, 1), (2, 2), (3, 3), (4, 4)]
        );
        let third = list.view_at(2).unwrap();
        assert_eq!(
            window.tree().element(third).unwrap().layout().frame(),
            Rect::new(0.0, 40.0, 100.0, 60.0)
        );
        assert_eq!(window.tree().children(list.container()).len(), 5);
    }

    #[test]
    fn scrolling_recycles_views() {
        let (mut window, mut list) = setup(100);
        list.scroll_to(&mut window, 100.0);
        assert_eq!(
            idents(&window, &list),
            vec![(5, 5), (6, 6), (7, 7), (8, 8), (9, 9)]
        );
        assert_eq!(list.adapter().created, 5, "no new views were needed");
        assert_eq!(list.adapter().recycled, 5);
        let first = list.view_at(5).unwrap();
        assert_eq!(window.tree().element(first).unwrap().layout().y(), 0.0);

        list.scroll_by(&mut window, 10.0);
        assert_eq!(list.realized().count(), 6, "a partially visible row joins");
        let first = list.view_at(5).unwrap();
        assert_eq!(window.tree().element(first).unwrap().layout().y(), -10.0);
    }

    #[test]
    fn data_changes_rebind() {
        let (mut window, mut list) = setup(100);
        list.adapter_mut().labels = vec![7, 8];
        list.observer().notify_changed();
        list.refresh(&mut window);
        assert_eq!(idents(&window, &list), vec![(0, 7), (1, 8)]);
        assert_eq!(window.tree().children(list.container()).len(), 2);
        assert_eq!(window.tree().cached_children(list.container()).len(), 3);
    }

    #[test]
    fn new_range_cancels_the_previous_load() {
        let (mut window, mut list) = setup(100);
        let first = list.current_ticket().cloned().unwrap();
        assert_eq!(first.range(), 0..5);
        let loader_view = first.cancel_token().clone();

        let second = list.scroll_to(&mut window, 200.0).unwrap();
        assert!(loader_view.is_cancelled());
        assert_eq!(second.range(), 10..15);
        assert!(second.generation() > first.generation());
        assert!(list.scroll_to(&mut window, 200.0).is_none(), "same range, same ticket");

        assert!(!list.complete_load(&mut window, &first, |rows| rows.labels[10] = 99));
        assert!(list.complete_load(&mut window, &second, |rows| rows.labels[10] = 99));
        let view = list.view_at(10).unwrap();
        assert_eq!(window.tree().element(view).unwrap().ident(), 99);
        assert_eq!(
            list.current_ticket().map(LoadTicket::generation),
            Some(second.generation()),
            "a completed load does not start another"
        );
        assert!(!second.cancel_token().is_cancelled());
    }

    /// Hands out the window root for one row, which the tree cannot accept as a child.
    struct Hijack {
        rows: usize,
        bad: usize,
    }

    impl Adapter for Hijack {
        fn count(&self) -> usize {
            self.rows
        }

        fn bind_view(
            &mut self,
            window: &mut Window,
            index: usize,
            recycled: Option<ViewId>,
        ) -> Option<ViewId> {
            if index == self.bad {
                return Some(window.root());
            }
            Some(recycled.unwrap_or_else(|| window.tree_mut().create_element(Plain)))
        }
    }

    #[test]
    fn rows_the_tree_refuses_stay_empty() {
        let (device, _) = RecordingDevice::new();
        let mut window = Window::new(
            device,
            Session::default(),
            Size::new(100.0, 100.0),
            WindowConfig::default(),
        );
        let root = window.root();
        let before = window.tree().element(root).unwrap().layout().frame();
        let adapter = Hijack { rows: 10, bad: 1 };
        let mut list = AdapterView::new(&mut window, root, adapter, 20.0, 0.0).unwrap();
        list.set_frame(&mut window, Rect::new(0.0, 0.0, 100.0, 100.0));

        assert_eq!(list.view_at(1), None, "the refused row is not realized");
        assert_eq!(
            list.realized().map(|(i, _)| i).collect::<Vec<_>>(),
            vec![0, 2, 3, 4]
        );
        assert_eq!(
            window.tree().element(root).unwrap().layout().frame(),
            before,
            "the root keeps its frame"
        );
        assert_eq!(window.tree().parent_of(root), None);
        assert_eq!(window.tree().children(list.container()).len(), 4);
    }

    #[test]
    fn rejects_a_non_container_parent() {
        let (device, _) = RecordingDevice::new();
        let mut window = Window::new(
            device,
            Session::default(),
            Size::new(10.0, 10.0),
            WindowConfig::default(),
        );
        let leaf = window.tree_mut().create_element(Plain);
        let rows = Rows::default();
        assert_eq!(
            AdapterView::new(&mut window, leaf, rows, 10.0, 0.0).err(),
            Some(TreeError::NotAContainer(leaf))
        );
    }
}
