// Copyright 2025 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The view arena: structure, layout, transforms, and hit testing.

use alloc::boxed::Box;
use alloc::vec::Vec;

use hashbrown::HashSet;
use kurbo::{Affine, Point, Rect};
use log::{debug, trace};
use thicket_responder::types::ParentLookup;

use crate::animation::AnimationHandle;
use crate::transform::{checked_inverse, transform_rect_bbox};
use crate::{DeviceChange, ElementData, Style, TreeError, ViewFlags, ViewId, Widget};

/// Slack for point containment, absorbing rounding from matrix inversion.
const HIT_EPSILON: f64 = 1e-9;

/// Arena owning every view of a window.
///
/// Views are either plain elements or containers ("layouts") with an ordered child
/// sequence. Child order is paint order; hit testing walks it in reverse so the last child
/// is tested first. A container also keeps a cache of children removed for reuse.
///
/// A view is *attached* when it is reachable from the window's root. Only attached views are
/// hit tested, painted, or focused; queries on detached or stale views report "not
/// applicable" (`None`/`false`) rather than failing.
///
/// ## Example
///
/// ```rust
/// use thicket_view::{Plain, ViewFlags, ViewTree};
///
/// let mut tree = ViewTree::new();
/// let list = tree.create_layout(Plain);
/// let a = tree.create_element(Plain);
/// let b = tree.create_element(Plain);
/// tree.add_view(list, a, None).unwrap();
/// tree.add_view(list, b, None).unwrap();
///
/// // The last child carries the front marker.
/// assert!(tree.flags(b).unwrap().contains(ViewFlags::FRONT));
///
/// tree.bring_to_front(list, a).unwrap();
/// assert_eq!(tree.children(list), &[b, a]);
/// assert!(tree.flags(a).unwrap().contains(ViewFlags::FRONT));
/// ```
pub struct ViewTree {
    /// slots
    nodes: Vec<Option<Node>>,
    /// last generation per slot (persists across frees)
    generations: Vec<u32>,
    free_list: Vec<usize>,
    /// views that receive device change notifications
    listeners: HashSet<ViewId>,
}

impl core::fmt::Debug for ViewTree {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.nodes.len();
        let alive = self.nodes.iter().filter(|n| n.is_some()).count();
        f.debug_struct("ViewTree")
            .field("nodes_total", &total)
            .field("nodes_alive", &alive)
            .field("free_list", &self.free_list.len())
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl Default for ViewTree {
    fn default() -> Self {
        Self::new()
    }
}

enum Kind {
    Element,
    Layout {
        children: Vec<ViewId>,
        cached: Vec<ViewId>,
    },
}

struct Node {
    generation: u32,
    parent: Option<ViewId>,
    cached_in: Option<ViewId>,
    attached: bool,
    kind: Kind,
    element: ElementData,
    widget: Option<Box<dyn Widget>>,
}

impl ViewTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            listeners: HashSet::new(),
        }
    }

    /// Create a detached plain element.
    pub fn create_element(&mut self, widget: impl Widget + 'static) -> ViewId {
        self.insert(Kind::Element, Box::new(widget))
    }

    /// Create a detached container.
    pub fn create_layout(&mut self, widget: impl Widget + 'static) -> ViewId {
        self.insert(
            Kind::Layout {
                children: Vec::new(),
                cached: Vec::new(),
            },
            Box::new(widget),
        )
    }

    fn insert(&mut self, kind: Kind, widget: Box<dyn Widget>) -> ViewId {
        let node = |generation| Node {
            generation,
            parent: None,
            cached_in: None,
            attached: false,
            kind,
            element: ElementData::default(),
            widget: Some(widget),
        };
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].wrapping_add(1);
            self.generations[idx] = generation;
            self.nodes[idx] = Some(node(generation));
            (idx, generation)
        } else {
            let generation = 1_u32;
            self.nodes.push(Some(node(generation)));
            self.generations.push(generation);
            (self.nodes.len() - 1, generation)
        };
        #[allow(
            clippy::cast_possible_truncation,
            reason = "view indices are 32-bit"
        )]
        ViewId::new(idx as u32, generation)
    }

    /// Returns true if `id` refers to a live view.
    pub fn is_alive(&self, id: ViewId) -> bool {
        self.node(id).is_some()
    }

    /// Returns true if `id` is a live container.
    pub fn is_layout(&self, id: ViewId) -> bool {
        matches!(self.node(id), Some(n) if matches!(n.kind, Kind::Layout { .. }))
    }

    /// Returns true if `id` is live and reachable from the window root.
    pub fn is_attached(&self, id: ViewId) -> bool {
        self.node(id).is_some_and(|n| n.attached)
    }

    /// Parent container of a live view, or `None` for roots, cached, and stale views.
    pub fn parent_of(&self, id: ViewId) -> Option<ViewId> {
        self.node(id)?.parent
    }

    /// Children of a container in paint order, or an empty slice.
    pub fn children(&self, id: ViewId) -> &[ViewId] {
        match self.node(id) {
            Some(Node {
                kind: Kind::Layout { children, .. },
                ..
            }) => children,
            _ => &[],
        }
    }

    /// Children removed into a container's reuse cache, oldest first.
    pub fn cached_children(&self, id: ViewId) -> &[ViewId] {
        match self.node(id) {
            Some(Node {
                kind: Kind::Layout { cached, .. },
                ..
            }) => cached,
            _ => &[],
        }
    }

    /// Element data of a live view.
    pub fn element(&self, id: ViewId) -> Option<&ElementData> {
        self.node(id).map(|n| &n.element)
    }

    /// Mutable element data of a live view.
    pub fn element_mut(&mut self, id: ViewId) -> Option<&mut ElementData> {
        self.node_mut(id).map(|n| &mut n.element)
    }

    /// Flags of a live view.
    pub fn flags(&self, id: ViewId) -> Option<ViewFlags> {
        self.element(id).map(ElementData::flags)
    }

    /// Add flags and re-derive the style; returns whether any flag changed.
    ///
    /// [`ViewFlags::FRONT`] is maintained by the tree and ignored here.
    pub fn add_flags(&mut self, id: ViewId, flags: ViewFlags) -> bool {
        let flags = flags - ViewFlags::FRONT;
        let changed = match self.element_mut(id) {
            Some(e) if !e.flags.contains(flags) => {
                e.flags |= flags;
                true
            }
            _ => false,
        };
        if changed {
            self.refresh_style(id);
        }
        changed
    }

    /// Remove flags and re-derive the style; returns whether any flag changed.
    ///
    /// [`ViewFlags::FRONT`] is maintained by the tree and ignored here.
    pub fn remove_flags(&mut self, id: ViewId, flags: ViewFlags) -> bool {
        let flags = flags - ViewFlags::FRONT;
        let changed = match self.element_mut(id) {
            Some(e) if e.flags.intersects(flags) => {
                e.flags -= flags;
                true
            }
            _ => false,
        };
        if changed {
            self.refresh_style(id);
        }
        changed
    }

    /// Set the style of a clickable view; returns whether it changed.
    ///
    /// Non-clickable views keep their style, so they never repaint for a style change.
    pub fn set_style(&mut self, id: ViewId, style: Style) -> bool {
        match self.element_mut(id) {
            Some(e) if e.flags.contains(ViewFlags::CLICKABLE) && e.style != style => {
                e.style = style;
                true
            }
            _ => false,
        }
    }

    /// Re-derive the style from flags and hover state; returns whether it changed.
    pub fn refresh_style(&mut self, id: ViewId) -> bool {
        let Some(e) = self.element(id) else {
            return false;
        };
        let style = Style::derive(e.flags, e.hovered);
        self.set_style(id, style)
    }

    /// Returns whether the style changed.
    pub(crate) fn set_hovered(&mut self, id: ViewId, hovered: bool) -> bool {
        if let Some(e) = self.element_mut(id) {
            e.hovered = hovered;
        }
        self.refresh_style(id)
    }

    /// Set or clear the animation referenced by a view.
    pub fn set_animation(&mut self, id: ViewId, animation: Option<AnimationHandle>) -> bool {
        match self.element_mut(id) {
            Some(e) => {
                e.animation = animation;
                true
            }
            None => false,
        }
    }

    /// The animation referenced by a view.
    pub fn animation(&self, id: ViewId) -> Option<&AnimationHandle> {
        self.element(id)?.animation.as_ref()
    }

    // --- structure ---

    /// Add `child` to `parent` at `index` (clamped), or at the end.
    ///
    /// A child that belongs to another container (or to a reuse cache) is moved, and the
    /// previous owner's front marker is updated. The child and its subtree take on the
    /// parent's attachment.
    pub fn add_view(
        &mut self,
        parent: ViewId,
        child: ViewId,
        index: Option<usize>,
    ) -> Result<(), TreeError> {
        if !self.is_alive(parent) {
            return rejected(TreeError::StaleView(parent));
        }
        if !self.is_alive(child) {
            return rejected(TreeError::StaleView(child));
        }
        if parent == child {
            return rejected(TreeError::SelfReference(parent));
        }
        if !self.is_layout(parent) {
            return rejected(TreeError::NotAContainer(parent));
        }
        if self.parent_of(child) == Some(parent) {
            return rejected(TreeError::AlreadyChild { parent, child });
        }
        if self.is_ancestor_or_self(child, parent) {
            return rejected(TreeError::WouldCreateCycle { parent, child });
        }

        self.detach(child);
        if let Some(Node {
            kind: Kind::Layout { children, .. },
            ..
        }) = self.node_mut(parent)
        {
            let at = index.unwrap_or(children.len()).min(children.len());
            children.insert(at, child);
        }
        if let Some(n) = self.node_mut(child) {
            n.parent = Some(parent);
        }
        let attached = self.is_attached(parent);
        self.set_attached(child, attached);
        self.recompute_front(parent);
        trace!("added {child:?} to {parent:?}");
        Ok(())
    }

    /// Remove `child` from `parent`.
    ///
    /// With `to_cache` the child is kept in the parent's reuse cache (see
    /// [`ViewTree::cached_children`]); otherwise it is destroyed with its subtree.
    pub fn remove_child(
        &mut self,
        parent: ViewId,
        child: ViewId,
        to_cache: bool,
    ) -> Result<(), TreeError> {
        if !self.is_alive(parent) {
            return rejected(TreeError::StaleView(parent));
        }
        if !self.is_layout(parent) {
            return rejected(TreeError::NotAContainer(parent));
        }
        if !self.is_alive(child) || self.parent_of(child) != Some(parent) {
            return rejected(TreeError::NotAChild { parent, child });
        }

        self.detach(child);
        if to_cache {
            if let Some(Node {
                kind: Kind::Layout { cached, .. },
                ..
            }) = self.node_mut(parent)
            {
                cached.push(child);
            }
            if let Some(n) = self.node_mut(child) {
                n.cached_in = Some(parent);
            }
            trace!("cached {child:?} in {parent:?}");
        } else {
            self.destroy_subtree(child);
            trace!("destroyed {child:?}");
        }
        Ok(())
    }

    /// Move `child` to the end of `parent`'s sequence (painted last, hit first).
    ///
    /// Returns `Ok(false)` if it already was the front child.
    pub fn bring_to_front(&mut self, parent: ViewId, child: ViewId) -> Result<bool, TreeError> {
        if !self.is_layout(parent) {
            return rejected(if self.is_alive(parent) {
                TreeError::NotAContainer(parent)
            } else {
                TreeError::StaleView(parent)
            });
        }
        if self.parent_of(child) != Some(parent) {
            return rejected(TreeError::NotAChild { parent, child });
        }
        if self.flags(child).is_some_and(|f| f.contains(ViewFlags::FRONT)) {
            return Ok(false);
        }
        if let Some(Node {
            kind: Kind::Layout { children, .. },
            ..
        }) = self.node_mut(parent)
        {
            children.retain(|c| *c != child);
            children.push(child);
        }
        self.recompute_front(parent);
        Ok(true)
    }

    /// Destroy every view in a container's reuse cache; returns how many were destroyed.
    pub fn clear_cache(&mut self, parent: ViewId) -> usize {
        let cached = self.cached_children(parent).to_vec();
        for &c in &cached {
            self.destroy(c);
        }
        cached.len()
    }

    /// Destroy a view and its subtree, detaching it first. Returns `false` for stale ids.
    pub fn destroy(&mut self, id: ViewId) -> bool {
        if !self.is_alive(id) {
            return false;
        }
        self.detach(id);
        self.destroy_subtree(id);
        true
    }

    /// Returns true if `ancestor` is `id` or one of its ancestors.
    pub fn is_ancestor_or_self(&self, ancestor: ViewId, id: ViewId) -> bool {
        let mut cur = Some(id);
        while let Some(c) = cur {
            if c == ancestor {
                return true;
            }
            cur = self.parent_of(c);
        }
        false
    }

    /// Depth-first search below (and including) `root` for a user identifier.
    pub fn find_by_id(&self, root: ViewId, ident: u32) -> Option<ViewId> {
        let node = self.node(root)?;
        if node.element.ident() == ident {
            return Some(root);
        }
        self.children(root)
            .iter()
            .find_map(|&c| self.find_by_id(c, ident))
    }

    /// Views below (and including) `root` in depth-first paint order.
    pub fn depth_first(&self, root: ViewId) -> Vec<ViewId> {
        let mut out = Vec::new();
        let mut stack = Vec::new();
        if self.is_alive(root) {
            stack.push(root);
        }
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    // --- layout ---

    /// Store a new layout box for `id` and run its layout hook.
    ///
    /// Width and height are clamped into the view's limits. The hook always runs; its
    /// `changed` argument (and the return value) is true only if a stored value changed.
    /// Returns `None` for stale ids.
    pub fn set_layout_info(
        &mut self,
        id: ViewId,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) -> Option<bool> {
        let changed = self.node_mut(id)?.element.layout.apply(x, y, width, height);
        if changed {
            trace!("layout {id:?} -> ({x}, {y}, {width}, {height})");
        }
        if self
            .with_widget(id, |w, tree| w.on_layout(tree, id, changed))
            .is_none()
        {
            // The widget is busy further up the stack; children still get their boxes.
            self.layout_children(id);
        }
        Some(changed)
    }

    /// Re-apply a view's own box to re-run its layout hooks.
    pub fn request_layout(&mut self, id: ViewId) -> Option<bool> {
        let b = *self.element(id)?.layout();
        self.set_layout_info(id, b.x(), b.y(), b.width(), b.height())
    }

    /// Re-apply each child's own stored box.
    pub fn layout_children(&mut self, id: ViewId) {
        let children = self.children(id).to_vec();
        for c in children {
            self.request_layout(c);
        }
    }

    // --- transforms ---

    /// Local visual matrix (translate/scale/rotate deltas), independent of the layout box.
    pub fn local_matrix(&self, id: ViewId) -> Option<Affine> {
        self.element(id).map(ElementData::local_matrix)
    }

    /// Current animation matrix, or identity without an animation or when disabled.
    pub fn animation_matrix(&self, id: ViewId) -> Option<Affine> {
        self.node(id).map(animation_matrix)
    }

    /// Matrix placing the view in device space, excluding its own animation.
    ///
    /// This is the parent's paint matrix, then the layout position, then the local matrix.
    pub fn absolute_matrix(&self, id: ViewId) -> Option<Affine> {
        let node = self.node(id)?;
        let parent = match node.parent {
            Some(p) => self.paint_matrix(p)?,
            None => Affine::IDENTITY,
        };
        Some(absolute_in(parent, node))
    }

    /// Absolute matrix combined with the view's own animation; used to paint and hit test.
    pub fn paint_matrix(&self, id: ViewId) -> Option<Affine> {
        let node = self.node(id)?;
        Some(self.absolute_matrix(id)? * animation_matrix(node))
    }

    pub(crate) fn paint_matrix_in(&self, id: ViewId, parent_paint: Affine) -> Option<Affine> {
        let node = self.node(id)?;
        Some(absolute_in(parent_paint, node) * animation_matrix(node))
    }

    /// Map a device point into the view's own coordinates.
    ///
    /// Returns `None` when the paint matrix is not invertible; callers treat that as no hit.
    pub fn device_to_local(&self, id: ViewId, point: Point) -> Option<Point> {
        let inv = checked_inverse(self.paint_matrix(id)?)?;
        let local = inv * point;
        (local.x.is_finite() && local.y.is_finite()).then_some(local)
    }

    /// Map a point in the view's own coordinates to device space.
    pub fn local_to_device(&self, id: ViewId, point: Point) -> Option<Point> {
        Some(self.paint_matrix(id)? * point)
    }

    /// Conservative device-space bounding box of the view.
    pub fn device_bounds(&self, id: ViewId) -> Option<Rect> {
        let local = self.element(id)?.layout().local_rect();
        Some(transform_rect_bbox(self.paint_matrix(id)?, local))
    }

    /// Whether a device point lies inside the view's bounds.
    pub fn contains_device_point(&self, id: ViewId, point: Point) -> bool {
        match (self.element(id), self.device_to_local(id, point)) {
            (Some(e), Some(local)) => contains_local(e, local),
            _ => false,
        }
    }

    // --- hit testing ---

    /// Find the view that takes a device point, tunneling from `root`.
    ///
    /// A container gets first refusal (see [`Widget::intercepts_pointer`]), then its children
    /// are tried topmost first. Hidden views and views whose matrix cannot be inverted are
    /// never hit. A detached `root` hits nothing.
    pub fn hit_test(&self, root: ViewId, point: Point) -> Option<ViewId> {
        if !self.is_attached(root) {
            return None;
        }
        let parent = match self.parent_of(root) {
            Some(p) => self.paint_matrix(p)?,
            None => Affine::IDENTITY,
        };
        self.hit_from(root, parent, point)
    }

    fn hit_from(&self, id: ViewId, parent_paint: Affine, point: Point) -> Option<ViewId> {
        let node = self.node(id)?;
        if !node.element.flags.contains(ViewFlags::VISIBLE) {
            return None;
        }
        let paint = absolute_in(parent_paint, node) * animation_matrix(node);
        let local = checked_inverse(paint)? * point;
        let inside = contains_local(&node.element, local);
        if !inside && !node.element.flags.contains(ViewFlags::ALWAYS_PAINT) {
            return None;
        }
        if inside
            && node
                .widget
                .as_ref()
                .is_some_and(|w| w.intercepts_pointer(&node.element, local))
        {
            trace!("{id:?} intercepted {point:?}");
            return Some(id);
        }
        if let Kind::Layout { children, .. } = &node.kind {
            for &child in children.iter().rev() {
                if let Some(hit) = self.hit_from(child, paint, point) {
                    return Some(hit);
                }
            }
        }
        inside.then_some(id)
    }

    // --- focus helpers ---

    /// Whether the view and all of its ancestors are visible.
    pub fn is_effectively_visible(&self, id: ViewId) -> bool {
        let mut cur = Some(id);
        while let Some(c) = cur {
            match self.flags(c) {
                Some(f) if f.contains(ViewFlags::VISIBLE) => cur = self.parent_of(c),
                _ => return false,
            }
        }
        true
    }

    /// Whether the view may receive keyboard focus: attached, effectively visible, enabled,
    /// and focusable.
    pub fn is_focus_eligible(&self, id: ViewId) -> bool {
        self.is_attached(id)
            && self
                .flags(id)
                .is_some_and(|f| f.contains(ViewFlags::FOCUSABLE | ViewFlags::ENABLED))
            && self.is_effectively_visible(id)
    }

    // --- device listeners ---

    /// Whether the view is registered for device change notifications.
    pub fn is_device_listener(&self, id: ViewId) -> bool {
        self.listeners.contains(&id)
    }

    /// Number of views registered for device change notifications.
    pub fn device_listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Release device resources of every registered view.
    ///
    /// The subtree of `root` (including reuse caches) is notified depth-first, then any other
    /// registered views. Returns the number of views notified.
    pub(crate) fn broadcast_device_change(&mut self, root: ViewId, change: DeviceChange) -> usize {
        let mut order = Vec::new();
        self.collect_with_caches(root, &mut order);
        let in_tree: HashSet<ViewId> = order.iter().copied().collect();
        let mut rest: Vec<ViewId> = self
            .listeners
            .iter()
            .copied()
            .filter(|id| !in_tree.contains(id))
            .collect();
        rest.sort_unstable();
        order.extend(rest);

        let mut notified = 0;
        for id in order {
            if !self.listeners.contains(&id) {
                continue;
            }
            if let Some(e) = self.element_mut(id) {
                e.release_device_resources();
            }
            self.with_widget(id, |w, _| w.on_device_change(change));
            notified += 1;
        }
        notified
    }

    fn collect_with_caches(&self, id: ViewId, out: &mut Vec<ViewId>) {
        if !self.is_alive(id) {
            return;
        }
        out.push(id);
        for &c in self.children(id) {
            self.collect_with_caches(c, out);
        }
        for &c in self.cached_children(id) {
            self.collect_with_caches(c, out);
        }
    }

    /// Destroy every view.
    pub(crate) fn clear(&mut self) {
        let roots: Vec<ViewId> = self
            .nodes
            .iter()
            .enumerate()
            .filter_map(|(i, n)| match n {
                Some(n) if n.parent.is_none() && n.cached_in.is_none() => {
                    #[allow(
                        clippy::cast_possible_truncation,
                        reason = "view indices are 32-bit"
                    )]
                    Some(ViewId::new(i as u32, n.generation))
                }
                _ => None,
            })
            .collect();
        for root in roots {
            self.destroy_subtree(root);
        }
    }

    // --- internals ---

    pub(crate) fn attach_root(&mut self, id: ViewId) {
        self.set_attached(id, true);
    }

    /// Run `f` with the view's widget taken out of the tree.
    ///
    /// Returns `None` for stale views and for widgets already running further up the stack.
    pub(crate) fn with_widget<R>(
        &mut self,
        id: ViewId,
        f: impl FnOnce(&mut dyn Widget, &mut Self) -> R,
    ) -> Option<R> {
        let mut widget = self.node_mut(id)?.widget.take()?;
        let result = f(widget.as_mut(), self);
        // The view may have been destroyed (and its slot reused) while the widget ran.
        if let Some(n) = self.node_mut(id) {
            n.widget = Some(widget);
        }
        Some(result)
    }

    pub(crate) fn widget_parts(
        &mut self,
        id: ViewId,
    ) -> Option<(&mut ElementData, &mut Option<Box<dyn Widget>>)> {
        let n = self.node_mut(id)?;
        Some((&mut n.element, &mut n.widget))
    }

    fn node(&self, id: ViewId) -> Option<&Node> {
        let n = self.nodes.get(id.idx())?.as_ref()?;
        (n.generation == id.1).then_some(n)
    }

    fn node_mut(&mut self, id: ViewId) -> Option<&mut Node> {
        let n = self.nodes.get_mut(id.idx())?.as_mut()?;
        (n.generation == id.1).then_some(n)
    }

    /// Take `id` out of its container or reuse cache.
    fn detach(&mut self, id: ViewId) {
        let Some(n) = self.node_mut(id) else {
            return;
        };
        let parent = n.parent.take();
        let cached_in = n.cached_in.take();
        n.element.flags -= ViewFlags::FRONT;
        if let Some(p) = parent {
            if let Some(Node {
                kind: Kind::Layout { children, .. },
                ..
            }) = self.node_mut(p)
            {
                children.retain(|c| *c != id);
            }
            self.recompute_front(p);
        }
        if let Some(Node {
            kind: Kind::Layout { cached, .. },
            ..
        }) = cached_in.and_then(|c| self.node_mut(c))
        {
            cached.retain(|c| *c != id);
        }
        self.set_attached(id, false);
    }

    fn set_attached(&mut self, id: ViewId, attached: bool) {
        let Some(n) = self.node_mut(id) else {
            return;
        };
        n.attached = attached;
        if attached {
            // Registration is idempotent; it only ends when the view is destroyed.
            self.listeners.insert(id);
        }
        let children = self.children(id).to_vec();
        for c in children {
            self.set_attached(c, attached);
        }
    }

    fn recompute_front(&mut self, parent: ViewId) {
        let children = self.children(parent).to_vec();
        let last = children.last().copied();
        for c in children {
            if let Some(e) = self.element_mut(c) {
                e.flags.set(ViewFlags::FRONT, Some(c) == last);
            }
        }
    }

    /// Free `id` and everything it owns. The view must already be detached.
    fn destroy_subtree(&mut self, id: ViewId) {
        let Some(node) = self.nodes.get_mut(id.idx()).and_then(Option::take) else {
            return;
        };
        if node.generation != id.1 {
            // Stale id; put the occupant back.
            self.nodes[id.idx()] = Some(node);
            return;
        }
        self.listeners.remove(&id);
        self.free_list.push(id.idx());
        if let Kind::Layout { children, cached } = node.kind {
            for c in children.into_iter().chain(cached) {
                self.destroy_subtree(c);
            }
        }
    }
}

impl ParentLookup<ViewId> for ViewTree {
    fn parent_of(&self, node: &ViewId) -> Option<ViewId> {
        Self::parent_of(self, *node)
    }
}

fn rejected<T>(err: TreeError) -> Result<T, TreeError> {
    debug!("tree operation rejected: {err}");
    Err(err)
}

fn animation_matrix(node: &Node) -> Affine {
    if node
        .element
        .flags
        .contains(ViewFlags::ANIMATION_MATRIX_DISABLED)
    {
        return Affine::IDENTITY;
    }
    node.element
        .animation
        .as_ref()
        .and_then(AnimationHandle::transform)
        .unwrap_or(Affine::IDENTITY)
}

fn absolute_in(parent_paint: Affine, node: &Node) -> Affine {
    let b = node.element.layout();
    parent_paint * Affine::translate((b.x(), b.y())) * node.element.local_matrix()
}

fn contains_local(element: &ElementData, local: Point) -> bool {
    element
        .layout()
        .local_rect()
        .inflate(HIT_EPSILON, HIT_EPSILON)
        .contains(local)
}
