// Copyright 2025 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The window: owns the tree and the device, and turns shell messages into dispatch.
//!
//! ## Pointer routing
//!
//! Every pointer message is hit tested against the root (container first refusal, then
//! children topmost first) to find the *event source*. A button-down pins its receiver as
//! the *event target*; until the matching button-up, moves and the release go exclusively to
//! the target and bubble from it toward the root. The event source still follows the
//! pointer while a target is pinned and newly hovered views are entered, but leave
//! notifications are held back until the button-up.
//!
//! Clicks are never performed inside the bubbling walk. A valid press-release queues a task
//! that runs once dispatch for the release has finished, so click handlers may freely
//! restructure the tree.
//!
//! ## Painting
//!
//! [`Window::paint`] advances animations, then paints the tree. A lost device is handled in
//! place: every registered view releases its device resources, the device is recreated,
//! and the frame is painted again. Resources come back lazily during that paint.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use hashbrown::HashMap;
use kurbo::{Affine, Point, Rect, Size};
use log::{debug, info, trace, warn};
use thicket_event_state::press::{
    DEFAULT_LONG_PRESS_MS, DEFAULT_SLOP, PressOptions, PressResult, PressState,
};
use thicket_event_state::queue::TaskQueue;
use thicket_focus::{FocusEntry, FocusPolicy, LinearPolicy, Navigation, WrapMode};
use thicket_responder::dispatcher;
use thicket_responder::router::Router;
use thicket_responder::types::{Dispatch, Outcome};

use crate::animation::AnimationHandle;
use crate::paint::{self, PaintCx};
use crate::{
    Damage, Device, DeviceChange, DeviceError, EventCx, Key, KeyEvent, Plain, PointerEvent,
    PointerEventKind, Session, TreeError, ViewFlags, ViewId, ViewTree, Widget,
};

/// How frames with running animations are scheduled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RepaintStrategy {
    /// A frame that painted an unfinished animation requests the next frame itself.
    #[default]
    PaintDriven,
    /// The shell drives animation frames through [`Window::on_timer`].
    TimerDriven,
}

/// Runtime window settings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WindowConfig {
    /// Animation frame scheduling.
    pub repaint: RepaintStrategy,
    /// Distance in device pixels a press may travel before it stops being a click.
    pub click_slop: f64,
    /// Press duration in milliseconds after which a long-clickable view long-clicks.
    pub long_press_ms: u64,
    /// Whether focus traversal wraps at the ends.
    pub focus_wrap: WrapMode,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            repaint: RepaintStrategy::PaintDriven,
            click_slop: DEFAULT_SLOP,
            long_press_ms: DEFAULT_LONG_PRESS_MS,
            focus_wrap: WrapMode::Wrap,
        }
    }
}

impl WindowConfig {
    /// Builder: repaint strategy.
    #[must_use]
    pub fn with_repaint(mut self, repaint: RepaintStrategy) -> Self {
        self.repaint = repaint;
        self
    }

    /// Builder: click slop.
    #[must_use]
    pub fn with_click_slop(mut self, slop: f64) -> Self {
        self.click_slop = slop;
        self
    }

    /// Builder: long-press threshold.
    #[must_use]
    pub fn with_long_press_ms(mut self, ms: u64) -> Self {
        self.long_press_ms = ms;
        self
    }

    /// Builder: focus wrap mode.
    #[must_use]
    pub fn with_focus_wrap(mut self, wrap: WrapMode) -> Self {
        self.focus_wrap = wrap;
        self
    }
}

/// Click callback, run after dispatch with full access to the window.
pub type ClickListener = Box<dyn FnMut(&mut Window, ViewId)>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PendingClick {
    Click(ViewId),
    LongClick(ViewId),
}

impl PendingClick {
    fn view(self) -> ViewId {
        match self {
            Self::Click(id) | Self::LongClick(id) => id,
        }
    }
}

/// A top-level window.
pub struct Window {
    tree: ViewTree,
    root: ViewId,
    device: Box<dyn Device>,
    session: Session,
    config: WindowConfig,
    size: Size,
    event_source: Option<ViewId>,
    event_target: Option<ViewId>,
    focus: Option<ViewId>,
    popup: Option<ViewId>,
    /// Views left while a target was pinned; they get their leave after the button-up.
    held_leaves: Vec<ViewId>,
    press: PressState<ViewId>,
    clicks: TaskQueue<PendingClick>,
    click_listeners: HashMap<ViewId, ClickListener>,
    long_click_listeners: HashMap<ViewId, ClickListener>,
    invalidated: Vec<ViewId>,
    damage: Damage,
    needs_paint: bool,
    animating: Vec<ViewId>,
}

impl fmt::Debug for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Window")
            .field("root", &self.root)
            .field("size", &self.size)
            .field("event_source", &self.event_source)
            .field("event_target", &self.event_target)
            .field("focus", &self.focus)
            .field("popup", &self.popup)
            .field("needs_paint", &self.needs_paint)
            .finish_non_exhaustive()
    }
}

impl Window {
    /// Create a window with a plain root container covering `size`.
    pub fn new(
        device: impl Device + 'static,
        session: Session,
        size: Size,
        config: WindowConfig,
    ) -> Self {
        Self::with_root(device, session, size, config, Plain)
    }

    /// Create a window whose root container runs `root_widget`.
    pub fn with_root(
        device: impl Device + 'static,
        session: Session,
        size: Size,
        config: WindowConfig,
        root_widget: impl Widget + 'static,
    ) -> Self {
        let mut tree = ViewTree::new();
        let root = tree.create_layout(root_widget);
        tree.attach_root(root);
        tree.set_layout_info(root, 0.0, 0.0, size.width, size.height);
        Self {
            tree,
            root,
            device: Box::new(device),
            session,
            config,
            size,
            event_source: None,
            event_target: None,
            focus: None,
            popup: None,
            held_leaves: Vec::new(),
            press: PressState::with_thresholds(config.click_slop, config.long_press_ms),
            clicks: TaskQueue::new(),
            click_listeners: HashMap::new(),
            long_click_listeners: HashMap::new(),
            invalidated: Vec::new(),
            damage: Damage::default(),
            needs_paint: true,
            animating: Vec::new(),
        }
    }

    /// The root container.
    pub fn root(&self) -> ViewId {
        self.root
    }

    /// The view tree.
    pub fn tree(&self) -> &ViewTree {
        &self.tree
    }

    /// The view tree, for direct mutation.
    ///
    /// Views removed through this bypass the window's bookkeeping; prefer
    /// [`Window::remove_child`].
    pub fn tree_mut(&mut self) -> &mut ViewTree {
        &mut self.tree
    }

    /// The session.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The configuration.
    pub fn config(&self) -> &WindowConfig {
        &self.config
    }

    /// Window size in device pixels.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Topmost view under the pointer.
    pub fn event_source(&self) -> Option<ViewId> {
        self.event_source
    }

    /// View pinned by the last button-down, until the matching button-up.
    pub fn event_target(&self) -> Option<ViewId> {
        self.event_target
    }

    /// Focused view.
    pub fn focus(&self) -> Option<ViewId> {
        self.focus
    }

    /// Visible pop-up.
    pub fn popup(&self) -> Option<ViewId> {
        self.popup
    }

    /// Whether a paint has been requested.
    pub fn needs_paint(&self) -> bool {
        self.needs_paint
    }

    /// Whether the last frame painted an unfinished animation.
    pub fn has_running_animations(&self) -> bool {
        !self.animating.is_empty()
    }

    // --- structure ---

    /// Add `child` to `parent`; see [`ViewTree::add_view`].
    pub fn add_view(
        &mut self,
        parent: ViewId,
        child: ViewId,
        index: Option<usize>,
    ) -> Result<(), TreeError> {
        self.tree.add_view(parent, child, index)?;
        self.invalidate_view(child);
        Ok(())
    }

    /// Remove `child` from `parent`; see [`ViewTree::remove_child`].
    ///
    /// Window references into the removed subtree (event source and target, focus, pop-up,
    /// presses and queued clicks) are cleared first, so no further input reaches it.
    pub fn remove_child(
        &mut self,
        parent: ViewId,
        child: ViewId,
        to_cache: bool,
    ) -> Result<(), TreeError> {
        if self.tree.parent_of(child) != Some(parent) {
            return self.tree.remove_child(parent, child, to_cache);
        }
        self.invalidate_view(child);
        self.collect_damage();

        let tree = &self.tree;
        let inside = |id: &ViewId| tree.is_ancestor_or_self(child, *id);
        for slot in [
            &mut self.event_source,
            &mut self.event_target,
            &mut self.focus,
            &mut self.popup,
        ] {
            if slot.as_ref().is_some_and(inside) {
                *slot = None;
            }
        }
        self.press.cancel_where(inside);
        self.clicks.retain(|task| !inside(&task.view()));
        self.animating.retain(|id| !inside(id));
        self.held_leaves.retain(|id| !inside(id));

        self.tree.remove_child(parent, child, to_cache)?;
        let tree = &self.tree;
        self.click_listeners.retain(|id, _| tree.is_alive(*id));
        self.long_click_listeners.retain(|id, _| tree.is_alive(*id));
        Ok(())
    }

    /// Run `listener` after `id` is clicked. Replaces any earlier listener.
    pub fn set_on_click(&mut self, id: ViewId, listener: impl FnMut(&mut Self, ViewId) + 'static) {
        self.click_listeners.insert(id, Box::new(listener));
    }

    /// Run `listener` after `id` is long-clicked. Replaces any earlier listener.
    pub fn set_on_long_click(
        &mut self,
        id: ViewId,
        listener: impl FnMut(&mut Self, ViewId) + 'static,
    ) {
        self.long_click_listeners.insert(id, Box::new(listener));
    }

    // --- pop-ups ---

    /// Show a view flagged [`ViewFlags::POPUP`] on top of its siblings.
    ///
    /// A detached pop-up is added to the root first. Any other visible pop-up is hidden.
    pub fn show_popup(&mut self, id: ViewId) -> Result<(), TreeError> {
        let Some(flags) = self.tree.flags(id) else {
            return Err(TreeError::StaleView(id));
        };
        if !flags.contains(ViewFlags::POPUP) {
            debug!("{id:?} is not a pop-up");
            return Err(TreeError::NotPopup(id));
        }
        if self.popup.is_some_and(|p| p != id) {
            self.hide_popup();
        }
        match self.tree.parent_of(id) {
            Some(parent) => {
                self.tree.bring_to_front(parent, id)?;
            }
            None => self.tree.add_view(self.root, id, None)?,
        }
        self.tree.add_flags(id, ViewFlags::VISIBLE);
        self.popup = Some(id);
        self.invalidate_view(id);
        Ok(())
    }

    /// Hide the current pop-up, returning it.
    pub fn hide_popup(&mut self) -> Option<ViewId> {
        let popup = self.popup.take()?;
        self.invalidate_view(popup);
        self.collect_damage();
        self.tree.remove_flags(popup, ViewFlags::VISIBLE);
        Some(popup)
    }

    /// Hide the pop-up if `point` is outside it.
    fn dismiss_popup(&mut self, point: Point) -> bool {
        let Some(popup) = self.popup else {
            return false;
        };
        let showing = self
            .tree
            .flags(popup)
            .is_some_and(|f| f.contains(ViewFlags::POPUP | ViewFlags::VISIBLE));
        if !showing {
            self.popup = None;
            return false;
        }
        if self.tree.contains_device_point(popup, point) {
            return false;
        }
        debug!("dismissing pop-up {popup:?}");
        self.hide_popup();
        true
    }

    // --- pointer input ---

    /// Dispatch a pointer message from the shell. Returns whether a view consumed it.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> bool {
        let hit = self.tree.hit_test(self.root, event.position);
        trace!("{:?} at {:?} hit {hit:?}", event.kind, event.position);
        let handled = match event.kind {
            PointerEventKind::Down => self.pointer_down(hit, &event),
            PointerEventKind::Up => self.pointer_up(hit, &event),
            PointerEventKind::Move => {
                self.update_hover(hit, &event);
                if self.event_target.is_some() {
                    if let Some(cancelled) = self.press.on_move(None, event.position) {
                        trace!("press on {cancelled:?} left the slop");
                        self.set_pressed(cancelled, false);
                    }
                }
                self.route(hit, &event).is_some()
            }
            PointerEventKind::Wheel { .. } => self.route(hit, &event).is_some(),
            PointerEventKind::Enter => {
                self.update_hover(hit, &event);
                false
            }
            PointerEventKind::Leave => {
                self.update_hover(None, &event);
                false
            }
        };
        self.collect_damage();
        handled
    }

    fn pointer_down(&mut self, hit: Option<ViewId>, event: &PointerEvent) -> bool {
        if self.dismiss_popup(event.position) {
            return true;
        }
        self.update_hover(hit, event);
        let Some(source) = hit else {
            return false;
        };
        self.focus_for_press(source);
        let consumed = self.bubble(source, event);
        self.event_target = Some(consumed.unwrap_or(source));
        trace!("pinned {:?}", self.event_target);
        consumed.is_some()
    }

    fn pointer_up(&mut self, hit: Option<ViewId>, event: &PointerEvent) -> bool {
        let consumed = self.route(hit, event);
        // A release consumed before reaching the pressed view ends the press without a click.
        if let Some(target) = self.press.cancel(None) {
            self.set_pressed(target, false);
        }
        self.event_target = None;
        self.flush_clicks();
        let hit = self.tree.hit_test(self.root, event.position);
        self.update_hover(hit, event);
        self.release_held_leaves(event);
        consumed.is_some()
    }

    /// Offer `event` to the event target, or to `hit` when nothing is pinned, and then to
    /// its ancestors until one consumes it.
    fn route(&mut self, hit: Option<ViewId>, event: &PointerEvent) -> Option<ViewId> {
        let seq = Router::new(&self.tree)
            .with_pinned(self.event_target)
            .route_bubbling(hit);
        self.offer(&seq, event)
    }

    /// Offer `event` to `start` and its ancestors, ignoring the event target.
    fn bubble(&mut self, start: ViewId, event: &PointerEvent) -> Option<ViewId> {
        let seq = Router::new(&self.tree).bubble(start);
        self.offer(&seq, event)
    }

    fn offer(&mut self, seq: &[Dispatch<ViewId>], event: &PointerEvent) -> Option<ViewId> {
        dispatcher::run(seq, self, |d, window| {
            Outcome::from_handled(window.offer_pointer(d.node, event))
        })
        .map(|d| d.node)
    }

    fn offer_pointer(&mut self, id: ViewId, event: &PointerEvent) -> bool {
        let enabled = self
            .tree
            .flags(id)
            .is_some_and(|f| f.contains(ViewFlags::ENABLED));
        if !enabled || !self.tree.is_attached(id) {
            return false;
        }
        if self
            .with_event_cx(id, |w, cx| w.on_pointer(cx, event))
            .unwrap_or(false)
        {
            return true;
        }
        self.default_pointer(id, event)
    }

    /// Built-in press handling for clickable views.
    fn default_pointer(&mut self, id: ViewId, event: &PointerEvent) -> bool {
        let Some(flags) = self.tree.flags(id) else {
            return false;
        };
        if !flags.contains(ViewFlags::CLICKABLE) {
            return false;
        }
        match event.kind {
            PointerEventKind::Down => {
                let options = PressOptions {
                    cancel_on_move: flags.contains(ViewFlags::CANCEL_EVENT),
                    long_clickable: flags.contains(ViewFlags::LONG_CLICKABLE),
                };
                self.press.on_down(
                    None,
                    Some(event.button),
                    id,
                    event.position,
                    event.time_ms,
                    options,
                );
                self.set_pressed(id, true);
                true
            }
            PointerEventKind::Up => {
                if !self.press.press(None).is_some_and(|p| p.target == id) {
                    return false;
                }
                let inside = self.tree.contains_device_point(id, event.position);
                let result =
                    self.press
                        .on_up(None, Some(event.button), event.position, inside, event.time_ms);
                self.set_pressed(id, false);
                match result {
                    PressResult::Click(target) => self.clicks.push(PendingClick::Click(target)),
                    PressResult::LongClick(target) => {
                        self.clicks.push(PendingClick::LongClick(target));
                    }
                    PressResult::Suppressed(_) => trace!("press on {id:?} suppressed"),
                }
                true
            }
            _ => false,
        }
    }

    /// Move the event source to `hit`, entering the new source.
    ///
    /// The old source is left at once, or after the button-up while a target is pinned.
    fn update_hover(&mut self, hit: Option<ViewId>, event: &PointerEvent) {
        if hit == self.event_source {
            return;
        }
        let old = core::mem::replace(&mut self.event_source, hit);
        if let Some(old) = old.filter(|o| self.tree.is_alive(*o)) {
            if self.event_target.is_some() {
                if !self.held_leaves.contains(&old) {
                    self.held_leaves.push(old);
                }
            } else {
                self.leave(old, event);
            }
        }
        if let Some(new) = hit {
            if let Some(pos) = self.held_leaves.iter().position(|h| *h == new) {
                // Never left, so no second Enter.
                self.held_leaves.swap_remove(pos);
                return;
            }
            if self.tree.set_hovered(new, true) {
                self.invalidate_view(new);
            }
            let enter = PointerEvent {
                kind: PointerEventKind::Enter,
                ..*event
            };
            self.with_event_cx(new, |w, cx| w.on_pointer(cx, &enter));
        }
    }

    fn leave(&mut self, id: ViewId, event: &PointerEvent) {
        if self.tree.set_hovered(id, false) {
            self.invalidate_view(id);
        }
        let leave = PointerEvent {
            kind: PointerEventKind::Leave,
            ..*event
        };
        self.with_event_cx(id, |w, cx| w.on_pointer(cx, &leave));
    }

    /// Deliver the leaves held back while a target was pinned.
    fn release_held_leaves(&mut self, event: &PointerEvent) {
        for id in core::mem::take(&mut self.held_leaves) {
            if Some(id) != self.event_source && self.tree.is_alive(id) {
                self.leave(id, event);
            }
        }
    }

    fn set_pressed(&mut self, id: ViewId, pressed: bool) {
        let changed = if pressed {
            self.tree.add_flags(id, ViewFlags::PRESSED)
        } else {
            self.tree.remove_flags(id, ViewFlags::PRESSED)
        };
        if changed {
            self.invalidate_view(id);
        }
    }

    fn flush_clicks(&mut self) {
        if !self.clicks.begin_drain() {
            // Already draining further up the stack; that loop picks up new tasks.
            return;
        }
        while let Some(task) = self.clicks.pop() {
            self.perform(task);
        }
        self.clicks.end_drain();
    }

    fn perform(&mut self, task: PendingClick) {
        let id = task.view();
        if !self.tree.is_attached(id) {
            return;
        }
        let long = matches!(task, PendingClick::LongClick(_));
        trace!("perform {task:?}");
        if !long && self.tree.flags(id).is_some_and(|f| f.contains(ViewFlags::TOGGLE)) {
            if !self.tree.remove_flags(id, ViewFlags::SELECTED) {
                self.tree.add_flags(id, ViewFlags::SELECTED);
            }
            self.invalidate_view(id);
        }
        self.with_event_cx(id, |w, cx| {
            if long {
                w.on_long_click(cx);
            } else {
                w.on_click(cx);
            }
        });
        let listener = if long {
            self.long_click_listeners.remove(&id)
        } else {
            self.click_listeners.remove(&id)
        };
        if let Some(mut listener) = listener {
            listener(self, id);
            if self.tree.is_alive(id) {
                let listeners = if long {
                    &mut self.long_click_listeners
                } else {
                    &mut self.click_listeners
                };
                listeners.entry(id).or_insert(listener);
            }
        }
    }

    fn with_event_cx<R>(
        &mut self,
        id: ViewId,
        f: impl FnOnce(&mut dyn Widget, &mut EventCx<'_>) -> R,
    ) -> Option<R> {
        let invalidated = &mut self.invalidated;
        self.tree.with_widget(id, |widget, tree| {
            let mut cx = EventCx::new(tree, id, invalidated);
            f(widget, &mut cx)
        })
    }

    // --- focus and keys ---

    /// Focus `id`, or clear focus with `None`.
    ///
    /// Only attached, effectively visible, enabled, focusable views can take focus. Returns
    /// whether focus is now where it was asked to be.
    pub fn set_focus(&mut self, id: Option<ViewId>) -> bool {
        if let Some(id) = id
            && !self.tree.is_focus_eligible(id)
        {
            debug!("{id:?} cannot take focus");
            return false;
        }
        if self.focus == id {
            return true;
        }
        let old = core::mem::replace(&mut self.focus, id);
        debug!("focus {old:?} -> {id:?}");
        if let Some(old) = old {
            self.with_event_cx(old, |w, cx| w.on_focus_changed(cx, false));
            self.invalidate_view(old);
        }
        if let Some(new) = id {
            self.with_event_cx(new, |w, cx| w.on_focus_changed(cx, true));
            self.invalidate_view(new);
        }
        self.collect_damage();
        true
    }

    /// Move focus in reading order (Tab/Shift+Tab) or toward a direction (arrow keys).
    ///
    /// Returns `false` if there was nowhere to go.
    pub fn move_focus(&mut self, navigation: Navigation) -> bool {
        let entries: Vec<FocusEntry<ViewId>> = self
            .tree
            .depth_first(self.root)
            .into_iter()
            .filter(|id| self.tree.is_focus_eligible(*id))
            .filter_map(|id| Some(FocusEntry::new(id, self.tree.device_bounds(id)?)))
            .collect();
        let policy = LinearPolicy {
            wrap: self.config.focus_wrap,
        };
        match policy.next(self.focus, navigation, &entries) {
            Some(next) if Some(next) != self.focus => self.set_focus(Some(next)),
            _ => false,
        }
    }

    /// A press focuses the nearest focusable view at or above `source`, or clears focus.
    fn focus_for_press(&mut self, source: ViewId) {
        let mut cur = Some(source);
        while let Some(id) = cur {
            if self.tree.is_focus_eligible(id) {
                self.set_focus(Some(id));
                return;
            }
            cur = self.tree.parent_of(id);
        }
        self.set_focus(None);
    }

    /// Dispatch a key message from the shell to the focused view. Returns whether it was
    /// handled.
    ///
    /// Unhandled presses fall back to window behavior: Tab moves focus, arrows move focus
    /// directionally, and Enter or Space click a clickable focused view.
    pub fn handle_key(&mut self, event: KeyEvent) -> bool {
        let focus = self.focus.filter(|f| self.tree.is_focus_eligible(*f));
        let handled = focus.is_some_and(|f| {
            self.with_event_cx(f, |w, cx| w.on_key(cx, &event))
                .unwrap_or(false)
        });
        let handled = handled || (event.pressed && self.default_key(focus, &event));
        self.collect_damage();
        handled
    }

    fn default_key(&mut self, focus: Option<ViewId>, event: &KeyEvent) -> bool {
        let navigation = match event.key {
            Key::Tab if event.shift => Navigation::Prev,
            Key::Tab => Navigation::Next,
            Key::ArrowUp => Navigation::Up,
            Key::ArrowDown => Navigation::Down,
            Key::ArrowLeft => Navigation::Left,
            Key::ArrowRight => Navigation::Right,
            Key::Enter | Key::Space => {
                let Some(f) = focus.filter(|f| {
                    self.tree
                        .flags(*f)
                        .is_some_and(|fl| fl.contains(ViewFlags::CLICKABLE))
                }) else {
                    return false;
                };
                self.clicks.push(PendingClick::Click(f));
                self.flush_clicks();
                return true;
            }
            _ => return false,
        };
        self.move_focus(navigation) || event.key == Key::Tab
    }

    // --- painting ---

    /// Record `id`'s device bounds as damaged and request a paint.
    pub fn invalidate_view(&mut self, id: ViewId) {
        self.invalidated.push(id);
        self.needs_paint = true;
    }

    /// Damage accumulated since the last paint.
    pub fn take_damage(&mut self) -> Damage {
        self.collect_damage();
        core::mem::take(&mut self.damage)
    }

    fn collect_damage(&mut self) {
        if self.invalidated.is_empty() {
            return;
        }
        self.needs_paint = true;
        for id in core::mem::take(&mut self.invalidated) {
            if self.tree.is_attached(id)
                && let Some(bounds) = self.tree.device_bounds(id)
            {
                self.damage.add(bounds);
            }
        }
    }

    fn invalidate_all(&mut self) {
        self.damage
            .add(Rect::from_origin_size(Point::ORIGIN, self.size));
        self.needs_paint = true;
    }

    /// Advance animations to `now_ms` and paint a frame.
    ///
    /// A lost device triggers [`DeviceChange::Lost`], device recreation and a second attempt.
    /// If the device cannot be recreated the frame is skipped and the error returned; the
    /// paint request stays pending.
    pub fn paint(&mut self, now_ms: u64) -> Result<(), DeviceError> {
        self.collect_damage();
        for id in &self.animating {
            if let Some(anim) = self.tree.animation(*id) {
                anim.advance(now_ms);
            }
        }
        match self.paint_frame() {
            Err(DeviceError::Lost) => {
                warn!("graphics device lost; recreating");
                self.notify_device_change(DeviceChange::Lost);
                if let Err(err) = self.device.recreate() {
                    warn!("device recreation failed: {err}");
                    return Err(err);
                }
                self.paint_frame()
            }
            result => result,
        }
    }

    fn paint_frame(&mut self) -> Result<(), DeviceError> {
        let epoch = self.device.epoch();
        let mut animating = Vec::new();
        {
            let target = self.device.begin_frame()?;
            let mut cx = PaintCx {
                target,
                session: &self.session,
                epoch,
                animating: &mut animating,
            };
            paint::paint_view(&mut self.tree, self.root, Affine::IDENTITY, &mut cx);
        }
        self.device.end_frame()?;
        self.damage = Damage::default();
        self.needs_paint =
            self.config.repaint == RepaintStrategy::PaintDriven && !animating.is_empty();
        self.animating = animating;
        Ok(())
    }

    /// Timer tick from the shell: paints if animations are running or a paint is pending.
    pub fn on_timer(&mut self, now_ms: u64) -> Result<(), DeviceError> {
        if self.animating.is_empty() && !self.needs_paint {
            return Ok(());
        }
        self.paint(now_ms)
    }

    /// Attach an animation to `id`, or detach with `None`.
    pub fn set_animation(&mut self, id: ViewId, animation: Option<AnimationHandle>) -> bool {
        let running = animation.is_some();
        if !self.tree.set_animation(id, animation) {
            return false;
        }
        self.animating.retain(|a| *a != id);
        if running {
            self.animating.push(id);
        }
        self.invalidate_view(id);
        true
    }

    /// Jump `id`'s animation to its end state and repaint once.
    pub fn finish_animation(&mut self, id: ViewId) -> bool {
        let Some(anim) = self.tree.animation(id) else {
            return false;
        };
        anim.finish();
        self.animating.retain(|a| *a != id);
        self.invalidate_view(id);
        true
    }

    /// Broadcast a device change to every registered view; returns how many were notified.
    pub fn notify_device_change(&mut self, change: DeviceChange) -> usize {
        let notified = self.tree.broadcast_device_change(self.root, change);
        debug!("{change:?} reached {notified} views");
        self.invalidate_all();
        notified
    }

    /// Resize the window: device resources are released, the device resized, and the root
    /// laid out again.
    pub fn resize(&mut self, size: Size) -> Result<(), DeviceError> {
        self.size = size;
        self.notify_device_change(DeviceChange::Resized(size));
        self.device.resize(size)?;
        self.tree
            .set_layout_info(self.root, 0.0, 0.0, size.width, size.height);
        self.invalidate_all();
        Ok(())
    }
}

impl Drop for Window {
    fn drop(&mut self) {
        let notified = self
            .tree
            .broadcast_device_change(self.root, DeviceChange::Teardown);
        info!("window torn down; {notified} views released device resources");
        self.click_listeners.clear();
        self.long_click_listeners.clear();
        self.tree.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Call, CallLog, MemoryResources, Probe, RecordingDevice};
    use crate::{Background, Image, PlainTheme, Tween};
    use alloc::rc::Rc;
    use alloc::vec;
    use core::cell::{Cell, RefCell};

    fn window() -> Window {
        let (device, _) = RecordingDevice::new();
        Window::new(
            device,
            Session::default(),
            Size::new(200.0, 200.0),
            WindowConfig::default(),
        )
    }

    fn add(win: &mut Window, parent: ViewId, widget: impl Widget + 'static, rect: Rect) -> ViewId {
        let id = win.tree_mut().create_element(widget);
        win.add_view(parent, id, None).unwrap();
        win.tree_mut()
            .set_layout_info(id, rect.x0, rect.y0, rect.width(), rect.height());
        id
    }

    fn clickable(win: &mut Window, log: &CallLog, rect: Rect) -> ViewId {
        let root = win.root();
        let id = add(win, root, Probe::new(log), rect);
        win.tree_mut().add_flags(id, ViewFlags::CLICKABLE);
        id
    }

    fn clicks(log: &CallLog) -> Vec<ViewId> {
        log.borrow()
            .iter()
            .filter_map(|c| match c {
                Call::Click(id) => Some(*id),
                _ => None,
            })
            .collect()
    }

    fn tap(win: &mut Window, at: (f64, f64)) {
        win.handle_pointer(PointerEvent::down(at, 0));
        win.handle_pointer(PointerEvent::up(at, 10));
    }

    #[test]
    fn release_goes_to_the_pinned_target() {
        let log = CallLog::default();
        let mut win = window();
        let a = clickable(&mut win, &log, Rect::new(0.0, 0.0, 50.0, 50.0));
        let b = clickable(&mut win, &log, Rect::new(100.0, 0.0, 150.0, 50.0));

        win.handle_pointer(PointerEvent::down((10.0, 10.0), 0));
        assert_eq!(win.event_target(), Some(a));
        win.handle_pointer(PointerEvent::moved((120.0, 10.0), 5));
        assert_eq!(win.event_source(), Some(b), "the source follows the pointer");
        assert_eq!(win.event_target(), Some(a), "the target stays pinned");
        {
            let calls = log.borrow();
            assert!(calls.contains(&Call::Pointer(a, PointerEventKind::Move)));
            assert!(
                calls.contains(&Call::Pointer(b, PointerEventKind::Enter)),
                "the new source is entered while pinned"
            );
            assert!(
                !calls.contains(&Call::Pointer(a, PointerEventKind::Leave)),
                "the pinned target is not left before release"
            );
        }
        win.handle_pointer(PointerEvent::up((120.0, 10.0), 10));

        let calls = log.borrow();
        assert!(calls.contains(&Call::Pointer(a, PointerEventKind::Up)));
        assert!(!calls.contains(&Call::Pointer(b, PointerEventKind::Up)));
        assert!(!calls.contains(&Call::Pointer(b, PointerEventKind::Move)));
        assert!(
            calls.contains(&Call::Pointer(a, PointerEventKind::Leave)),
            "the held leave arrives after release"
        );
        drop(calls);
        assert_eq!(win.event_target(), None);
        assert_eq!(win.event_source(), Some(b));
        assert!(!win.tree().element(a).unwrap().is_hovered());
        assert!(win.tree().element(b).unwrap().is_hovered());
        assert!(clicks(&log).is_empty(), "released outside the pressed view");
    }

    #[test]
    fn returning_to_the_pinned_target_does_not_reenter_it() {
        let log = CallLog::default();
        let mut win = window();
        let a = clickable(&mut win, &log, Rect::new(0.0, 0.0, 50.0, 50.0));
        let b = clickable(&mut win, &log, Rect::new(100.0, 0.0, 150.0, 50.0));

        win.handle_pointer(PointerEvent::down((10.0, 10.0), 0));
        win.handle_pointer(PointerEvent::moved((120.0, 10.0), 5));
        win.handle_pointer(PointerEvent::moved((10.0, 10.0), 6));
        assert_eq!(win.event_source(), Some(a));
        assert!(
            !log.borrow().contains(&Call::Pointer(b, PointerEventKind::Leave)),
            "leaves wait for the release"
        );
        win.handle_pointer(PointerEvent::up((10.0, 10.0), 10));

        let calls = log.borrow();
        let enters = calls
            .iter()
            .filter(|c| **c == Call::Pointer(a, PointerEventKind::Enter))
            .count();
        assert_eq!(enters, 1, "the pinned view was never left");
        assert!(!calls.contains(&Call::Pointer(a, PointerEventKind::Leave)));
        assert!(calls.contains(&Call::Pointer(b, PointerEventKind::Leave)));
        drop(calls);
        assert!(win.tree().element(a).unwrap().is_hovered());
        assert!(!win.tree().element(b).unwrap().is_hovered());
    }

    #[test]
    fn moving_beyond_the_slop_cancels_the_click() {
        let log = CallLog::default();
        let mut win = window();
        let a = clickable(&mut win, &log, Rect::new(0.0, 0.0, 100.0, 100.0));

        win.handle_pointer(PointerEvent::down((10.0, 10.0), 0));
        win.handle_pointer(PointerEvent::moved((30.0, 10.0), 5));
        assert!(
            !win.tree().flags(a).unwrap().contains(ViewFlags::PRESSED),
            "leaving the slop drops the pressed state"
        );
        win.handle_pointer(PointerEvent::up((12.0, 10.0), 10));
        assert!(clicks(&log).is_empty(), "coming back does not revive the press");

        win.handle_pointer(PointerEvent::down((10.0, 10.0), 20));
        win.handle_pointer(PointerEvent::moved((13.0, 11.0), 25));
        win.handle_pointer(PointerEvent::up((13.0, 11.0), 30));
        assert_eq!(clicks(&log), vec![a]);
    }

    #[test]
    fn release_far_from_the_press_never_clicks() {
        let log = CallLog::default();
        let mut win = window();
        clickable(&mut win, &log, Rect::new(0.0, 0.0, 100.0, 100.0));
        win.handle_pointer(PointerEvent::down((10.0, 10.0), 0));
        win.handle_pointer(PointerEvent::up((40.0, 10.0), 10));
        assert!(clicks(&log).is_empty());
    }

    #[test]
    fn cancel_on_move_can_be_disabled() {
        let log = CallLog::default();
        let mut win = window();
        let a = clickable(&mut win, &log, Rect::new(0.0, 0.0, 100.0, 100.0));
        win.tree_mut().remove_flags(a, ViewFlags::CANCEL_EVENT);
        win.handle_pointer(PointerEvent::down((10.0, 10.0), 0));
        win.handle_pointer(PointerEvent::moved((80.0, 80.0), 5));
        win.handle_pointer(PointerEvent::up((80.0, 80.0), 10));
        assert_eq!(clicks(&log), vec![a]);
    }

    #[test]
    fn long_press_long_clicks() {
        let log = CallLog::default();
        let mut win = window();
        let a = clickable(&mut win, &log, Rect::new(0.0, 0.0, 100.0, 100.0));
        win.tree_mut().add_flags(a, ViewFlags::LONG_CLICKABLE);
        let fired = Rc::new(Cell::new(0));
        let f = fired.clone();
        win.set_on_long_click(a, move |_, _| f.set(f.get() + 1));

        win.handle_pointer(PointerEvent::down((10.0, 10.0), 1_000));
        win.handle_pointer(PointerEvent::up((10.0, 10.0), 1_600));
        assert!(log.borrow().contains(&Call::LongClick(a)));
        assert!(clicks(&log).is_empty());
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn clicks_run_after_dispatch_and_may_restructure() {
        let log = CallLog::default();
        let mut win = window();
        let a = clickable(&mut win, &log, Rect::new(0.0, 0.0, 50.0, 50.0));
        let root = win.root();
        win.set_on_click(a, move |win, id| {
            win.remove_child(root, id, false).unwrap();
        });
        tap(&mut win, (10.0, 10.0));
        assert_eq!(clicks(&log), vec![a]);
        assert!(!win.tree().is_alive(a));
        assert_eq!(win.event_source(), Some(root));
    }

    #[test]
    fn nested_release_does_not_flush_recursively() {
        let log = CallLog::default();
        let mut win = window();
        let a = clickable(&mut win, &log, Rect::new(0.0, 0.0, 50.0, 50.0));
        let b = clickable(&mut win, &log, Rect::new(100.0, 0.0, 150.0, 50.0));
        let order = Rc::new(RefCell::new(Vec::new()));
        let o = order.clone();
        win.set_on_click(a, move |win, id| {
            o.borrow_mut().push(("a start", id));
            tap(win, (110.0, 10.0));
            o.borrow_mut().push(("a end", id));
        });
        let o = order.clone();
        win.set_on_click(b, move |_, id| o.borrow_mut().push(("b", id)));

        tap(&mut win, (10.0, 10.0));
        assert_eq!(
            order.borrow().as_slice(),
            &[("a start", a), ("a end", a), ("b", b)],
            "the nested click waits for the outer drain"
        );
        assert_eq!(clicks(&log), vec![a, b]);
    }

    #[test]
    fn consuming_child_stops_bubbling() {
        let log = CallLog::default();
        let mut win = window();
        let root = win.root();
        let panel = win.tree_mut().create_layout(Probe::new(&log));
        win.add_view(root, panel, None).unwrap();
        win.tree_mut().set_layout_info(panel, 0.0, 0.0, 100.0, 100.0);
        let leaf = add(&mut win, panel, Probe::consuming(&log), Rect::new(0.0, 0.0, 20.0, 20.0));

        assert!(win.handle_pointer(PointerEvent::down((5.0, 5.0), 0)));
        assert_eq!(win.event_target(), Some(leaf));
        assert!(!log.borrow().contains(&Call::Pointer(panel, PointerEventKind::Down)));

        win.handle_pointer(PointerEvent::up((5.0, 5.0), 1));
        assert!(!win.handle_pointer(PointerEvent::down((50.0, 50.0), 2)));
        assert!(
            log.borrow()
                .contains(&Call::Pointer(panel, PointerEventKind::Down)),
            "unconsumed events reach the container"
        );
    }

    #[test]
    fn press_bubbles_to_clickable_ancestor() {
        let log = CallLog::default();
        let mut win = window();
        let root = win.root();
        let button = win.tree_mut().create_layout(Probe::new(&log));
        win.add_view(root, button, None).unwrap();
        win.tree_mut().set_layout_info(button, 0.0, 0.0, 100.0, 40.0);
        win.tree_mut().add_flags(button, ViewFlags::CLICKABLE);
        let label = add(&mut win, button, Plain, Rect::new(10.0, 10.0, 60.0, 30.0));

        win.handle_pointer(PointerEvent::down((20.0, 20.0), 0));
        assert_eq!(win.event_source(), Some(label));
        assert_eq!(win.event_target(), Some(button));
        win.handle_pointer(PointerEvent::up((20.0, 20.0), 10));
        assert_eq!(clicks(&log), vec![button]);
    }

    #[test]
    fn disabled_views_do_not_click() {
        let log = CallLog::default();
        let mut win = window();
        let a = clickable(&mut win, &log, Rect::new(0.0, 0.0, 50.0, 50.0));
        win.tree_mut().remove_flags(a, ViewFlags::ENABLED);
        tap(&mut win, (10.0, 10.0));
        assert!(clicks(&log).is_empty());
        assert!(!log.borrow().iter().any(|c| matches!(c, Call::Pointer(_, PointerEventKind::Down))));
    }

    #[test]
    fn toggles_flip_selection() {
        let log = CallLog::default();
        let mut win = window();
        let a = clickable(&mut win, &log, Rect::new(0.0, 0.0, 50.0, 50.0));
        win.tree_mut().add_flags(a, ViewFlags::TOGGLE);
        tap(&mut win, (10.0, 10.0));
        assert!(win.tree().flags(a).unwrap().contains(ViewFlags::SELECTED));
        tap(&mut win, (10.0, 10.0));
        assert!(!win.tree().flags(a).unwrap().contains(ViewFlags::SELECTED));
    }

    #[test]
    fn hover_enters_and_leaves() {
        let log = CallLog::default();
        let mut win = window();
        let a = clickable(&mut win, &log, Rect::new(0.0, 0.0, 50.0, 50.0));
        win.handle_pointer(PointerEvent::moved((10.0, 10.0), 0));
        assert_eq!(win.event_source(), Some(a));
        assert_eq!(win.tree().element(a).unwrap().style(), crate::Style::Hover);
        win.handle_pointer(PointerEvent::moved((100.0, 100.0), 1));
        assert_eq!(win.event_source(), Some(win.root()));
        assert_eq!(win.tree().element(a).unwrap().style(), crate::Style::Normal);
        let calls = log.borrow();
        assert!(calls.contains(&Call::Pointer(a, PointerEventKind::Enter)));
        assert!(calls.contains(&Call::Pointer(a, PointerEventKind::Leave)));
    }

    #[test]
    fn popup_dismissal_comes_first() {
        let log = CallLog::default();
        let mut win = window();
        let a = clickable(&mut win, &log, Rect::new(0.0, 0.0, 50.0, 50.0));
        win.tree_mut().add_flags(a, ViewFlags::FOCUSABLE);
        let popup = win.tree_mut().create_element(Probe::new(&log));
        win.tree_mut()
            .set_layout_info(popup, 100.0, 100.0, 50.0, 50.0);
        assert_eq!(win.show_popup(popup), Err(TreeError::NotPopup(popup)));
        win.tree_mut().add_flags(popup, ViewFlags::POPUP);
        win.show_popup(popup).unwrap();
        assert_eq!(win.popup(), Some(popup));
        assert_eq!(win.tree().parent_of(popup), Some(win.root()));

        // Inside the pop-up: it stays.
        win.handle_pointer(PointerEvent::down((120.0, 120.0), 0));
        win.handle_pointer(PointerEvent::up((120.0, 120.0), 1));
        assert_eq!(win.popup(), Some(popup));

        log.borrow_mut().clear();
        assert!(win.handle_pointer(PointerEvent::down((10.0, 10.0), 2)));
        assert_eq!(win.popup(), None);
        assert!(!win.tree().flags(popup).unwrap().contains(ViewFlags::VISIBLE));
        assert!(
            !log.borrow()
                .iter()
                .any(|c| matches!(c, Call::Pointer(_, PointerEventKind::Down))),
            "the dismissing press goes nowhere else"
        );
        assert_eq!(win.focus(), None);
        assert_eq!(win.event_target(), None);
    }

    #[test]
    fn press_focuses_nearest_focusable() {
        let log = CallLog::default();
        let mut win = window();
        let root = win.root();
        let field = win.tree_mut().create_layout(Probe::new(&log));
        win.add_view(root, field, None).unwrap();
        win.tree_mut().set_layout_info(field, 0.0, 0.0, 100.0, 50.0);
        win.tree_mut().add_flags(field, ViewFlags::FOCUSABLE);
        add(&mut win, field, Plain, Rect::new(5.0, 5.0, 20.0, 20.0));

        tap(&mut win, (10.0, 10.0));
        assert_eq!(win.focus(), Some(field));
        assert!(log.borrow().contains(&Call::Focus(field, true)));

        tap(&mut win, (150.0, 150.0));
        assert_eq!(win.focus(), None, "pressing outside any focusable view clears focus");
        assert!(log.borrow().contains(&Call::Focus(field, false)));
    }

    #[test]
    fn focus_requires_eligibility() {
        let mut win = window();
        let root = win.root();
        let a = add(&mut win, root, Plain, Rect::new(0.0, 0.0, 10.0, 10.0));
        assert!(!win.set_focus(Some(a)));
        win.tree_mut().add_flags(a, ViewFlags::FOCUSABLE);
        win.tree_mut().remove_flags(root, ViewFlags::VISIBLE);
        assert!(!win.set_focus(Some(a)), "hidden ancestors hide the view");
        win.tree_mut().add_flags(root, ViewFlags::VISIBLE);
        assert!(win.set_focus(Some(a)));
        assert_eq!(win.focus(), Some(a));
    }

    #[test]
    fn tab_cycles_and_keys_reach_only_the_focus() {
        let log = CallLog::default();
        let mut win = window();
        let root = win.root();
        let a = add(&mut win, root, Probe::new(&log), Rect::new(0.0, 0.0, 20.0, 20.0));
        let b = add(&mut win, root, Probe::new(&log), Rect::new(50.0, 0.0, 70.0, 20.0));
        for id in [a, b] {
            win.tree_mut().add_flags(id, ViewFlags::FOCUSABLE);
        }

        assert!(win.handle_key(KeyEvent::press(Key::Tab)));
        assert_eq!(win.focus(), Some(a));
        assert!(win.handle_key(KeyEvent::press(Key::Tab)));
        assert_eq!(win.focus(), Some(b));
        assert!(win.handle_key(KeyEvent::press(Key::Tab)));
        assert_eq!(win.focus(), Some(a), "wraps");
        assert!(win.handle_key(KeyEvent::press(Key::Tab).with_shift(true)));
        assert_eq!(win.focus(), Some(b));

        log.borrow_mut().clear();
        win.handle_key(KeyEvent::press(Key::Character('x')));
        assert_eq!(log.borrow().as_slice(), &[Call::Key(b, Key::Character('x'))]);
    }

    #[test]
    fn enter_clicks_the_focused_view() {
        let log = CallLog::default();
        let mut win = window();
        let a = clickable(&mut win, &log, Rect::new(0.0, 0.0, 20.0, 20.0));
        assert!(!win.handle_key(KeyEvent::press(Key::Enter)), "nothing focused");
        win.tree_mut().add_flags(a, ViewFlags::FOCUSABLE);
        win.set_focus(Some(a));
        assert!(win.handle_key(KeyEvent::press(Key::Enter)));
        assert!(win.handle_key(KeyEvent::press(Key::Space)));
        assert_eq!(clicks(&log), vec![a, a]);
    }

    #[test]
    fn removing_a_view_clears_window_references() {
        let log = CallLog::default();
        let mut win = window();
        let root = win.root();
        let a = clickable(&mut win, &log, Rect::new(0.0, 0.0, 50.0, 50.0));
        win.tree_mut().add_flags(a, ViewFlags::FOCUSABLE);

        win.handle_pointer(PointerEvent::down((10.0, 10.0), 0));
        assert_eq!(win.event_target(), Some(a));
        assert_eq!(win.focus(), Some(a));
        win.remove_child(root, a, true).unwrap();
        assert_eq!(win.event_source(), None);
        assert_eq!(win.event_target(), None);
        assert_eq!(win.focus(), None);

        log.borrow_mut().clear();
        win.handle_pointer(PointerEvent::up((10.0, 10.0), 5));
        assert!(log.borrow().is_empty(), "a removed view gets no more input");
        assert_eq!(
            win.remove_child(root, a, false),
            Err(TreeError::NotAChild { parent: root, child: a })
        );
    }

    #[test]
    fn bring_to_front_and_layout_through_the_window() {
        let mut win = window();
        let root = win.root();
        let c = win.tree_mut().create_layout(Plain);
        win.add_view(root, c, None).unwrap();
        let a = win.tree_mut().create_element(Plain);
        let b = win.tree_mut().create_element(Plain);
        win.add_view(c, a, None).unwrap();
        win.add_view(c, b, None).unwrap();
        win.tree_mut().bring_to_front(c, a).unwrap();
        assert_eq!(win.tree().children(c), &[b, a]);
        assert!(win.tree().flags(a).unwrap().contains(ViewFlags::FRONT));

        win.tree_mut()
            .element_mut(a)
            .unwrap()
            .layout_mut()
            .set_width_limits(50.0, 100.0);
        win.tree_mut().set_layout_info(a, 0.0, 0.0, 10.0, 10.0);
        assert_eq!(win.tree().element(a).unwrap().layout().width(), 50.0);
        win.tree_mut().set_layout_info(a, 0.0, 0.0, 500.0, 10.0);
        assert_eq!(win.tree().element(a).unwrap().layout().width(), 100.0);
    }

    #[test]
    fn device_loss_recreates_resources_lazily() {
        let (device, dev) = RecordingDevice::new();
        let mut resources = MemoryResources::default();
        resources.insert("tile", Image::new(2, 2, vec![0; 16]));
        let session = Session::new(Rc::new(PlainTheme), Rc::new(resources));
        let mut win = Window::new(device, session, Size::new(100.0, 100.0), WindowConfig::default());
        let log = CallLog::default();
        let root = win.root();
        let a = add(&mut win, root, Probe::new(&log), Rect::new(0.0, 0.0, 10.0, 10.0));
        win.tree_mut()
            .element_mut(a)
            .unwrap()
            .set_background(Background::Image("tile".into()));

        win.paint(0).unwrap();
        assert_eq!(win.tree().element(a).unwrap().cached_bitmap().unwrap().epoch(), 1);

        dev.borrow_mut().lose_next_frame = true;
        win.paint(16).unwrap();
        assert!(log.borrow().contains(&Call::Device(DeviceChange::Lost)));
        let bitmap = win.tree().element(a).unwrap().cached_bitmap();
        assert_eq!(bitmap.map(|b| b.epoch()), Some(2), "recreated for the new device");
        assert_eq!(dev.borrow().frames, 2);
    }

    #[test]
    fn broadcast_then_paint_restores_resources() {
        let (device, _) = RecordingDevice::new();
        let mut resources = MemoryResources::default();
        resources.insert("tile", Image::new(1, 1, vec![0; 4]));
        let session = Session::new(Rc::new(PlainTheme), Rc::new(resources));
        let mut win = Window::new(device, session, Size::new(100.0, 100.0), WindowConfig::default());
        let root = win.root();
        let panel = win.tree_mut().create_layout(Plain);
        win.add_view(root, panel, None).unwrap();
        win.tree_mut().set_layout_info(panel, 0.0, 0.0, 100.0, 100.0);
        let leaves: Vec<ViewId> = (0..3)
            .map(|i| {
                let x = f64::from(i) * 20.0;
                let id = add(&mut win, panel, Plain, Rect::new(x, 0.0, x + 10.0, 10.0));
                win.tree_mut()
                    .element_mut(id)
                    .unwrap()
                    .set_background(Background::Image("tile".into()));
                id
            })
            .collect();
        win.paint(0).unwrap();

        assert_eq!(win.notify_device_change(DeviceChange::Lost), 5);
        for &id in &leaves {
            assert!(win.tree().element(id).unwrap().cached_bitmap().is_none());
        }
        assert!(win.needs_paint());
        win.paint(1).unwrap();
        for &id in &leaves {
            assert!(win.tree().element(id).unwrap().cached_bitmap().is_some());
        }
    }

    #[test]
    fn failed_recreation_skips_the_frame() {
        let (device, dev) = RecordingDevice::new();
        let mut win = Window::new(
            device,
            Session::default(),
            Size::new(10.0, 10.0),
            WindowConfig::default(),
        );
        {
            let mut d = dev.borrow_mut();
            d.lose_next_frame = true;
            d.fail_recreate = true;
        }
        assert_eq!(win.paint(0), Err(DeviceError::Unavailable));
        assert!(win.needs_paint());
        dev.borrow_mut().fail_recreate = false;
        assert_eq!(win.paint(1), Ok(()));
        assert!(!win.needs_paint());
    }

    #[test]
    fn paint_driven_animation_requests_frames() {
        let mut win = window();
        let root = win.root();
        let a = add(&mut win, root, Plain, Rect::new(0.0, 0.0, 10.0, 10.0));
        let tween = Rc::new(RefCell::new(Tween::new(
            Affine::IDENTITY,
            Affine::translate((50.0, 0.0)),
            100,
        )));
        win.set_animation(a, Some(AnimationHandle::new(&tween)));

        win.paint(0).unwrap();
        assert!(win.needs_paint(), "an unfinished animation asks for the next frame");
        win.paint(50).unwrap();
        assert_eq!(
            win.tree().local_to_device(a, Point::ORIGIN),
            Some(Point::new(25.0, 0.0))
        );
        assert_eq!(win.tree().absolute_matrix(a), Some(Affine::IDENTITY));
        win.paint(100).unwrap();
        assert!(!win.needs_paint());
        assert!(!win.has_running_animations());
    }

    #[test]
    fn timer_driven_animation_waits_for_ticks() {
        let (device, dev) = RecordingDevice::new();
        let config = WindowConfig::default().with_repaint(RepaintStrategy::TimerDriven);
        let mut win = Window::new(device, Session::default(), Size::new(50.0, 50.0), config);
        let root = win.root();
        let a = add(&mut win, root, Plain, Rect::new(0.0, 0.0, 10.0, 10.0));
        let tween = Rc::new(RefCell::new(Tween::new(
            Affine::IDENTITY,
            Affine::translate((10.0, 0.0)),
            100,
        )));
        win.set_animation(a, Some(AnimationHandle::new(&tween)));

        win.paint(0).unwrap();
        assert!(!win.needs_paint());
        assert!(win.has_running_animations());
        win.on_timer(16).unwrap();
        assert_eq!(dev.borrow().frames, 2);

        assert!(win.finish_animation(a));
        win.on_timer(32).unwrap();
        assert!(!win.has_running_animations());
        assert_eq!(tween.borrow().progress(), 1.0);
        win.on_timer(48).unwrap();
        assert_eq!(dev.borrow().frames, 3, "idle ticks paint nothing");
    }

    #[test]
    fn disabled_animation_matrix_is_identity() {
        let mut win = window();
        let root = win.root();
        let a = add(&mut win, root, Plain, Rect::new(0.0, 0.0, 10.0, 10.0));
        let tween = Rc::new(RefCell::new(Tween::new(
            Affine::translate((5.0, 0.0)),
            Affine::translate((5.0, 0.0)),
            10,
        )));
        win.set_animation(a, Some(AnimationHandle::new(&tween)));
        assert_eq!(win.tree().animation_matrix(a), Some(Affine::translate((5.0, 0.0))));
        win.tree_mut().add_flags(a, ViewFlags::ANIMATION_MATRIX_DISABLED);
        assert_eq!(win.tree().animation_matrix(a), Some(Affine::IDENTITY));
    }

    #[test]
    fn damage_covers_invalidated_views() {
        let mut win = window();
        win.paint(0).unwrap();
        let root = win.root();
        let a = add(&mut win, root, Plain, Rect::new(10.0, 20.0, 30.0, 40.0));
        win.paint(1).unwrap();
        assert!(win.take_damage().is_empty());

        win.invalidate_view(a);
        let damage = win.take_damage();
        assert_eq!(damage.union_rect(), Some(Rect::new(10.0, 20.0, 30.0, 40.0)));
        assert!(win.needs_paint());
    }

    #[test]
    fn resize_relayouts_and_notifies() {
        let (device, dev) = RecordingDevice::new();
        let mut win = Window::new(
            device,
            Session::default(),
            Size::new(10.0, 10.0),
            WindowConfig::default(),
        );
        let log = CallLog::default();
        let root = win.root();
        add(&mut win, root, Probe::new(&log), Rect::new(0.0, 0.0, 5.0, 5.0));

        let size = Size::new(300.0, 200.0);
        win.resize(size).unwrap();
        assert_eq!(dev.borrow().resized, Some(size));
        assert_eq!(win.tree().element(root).unwrap().layout().size(), size);
        assert!(log.borrow().contains(&Call::Device(DeviceChange::Resized(size))));
    }

    #[test]
    fn teardown_notifies_before_destroying() {
        let log = CallLog::default();
        let mut win = window();
        let root = win.root();
        let a = add(&mut win, root, Probe::new(&log), Rect::new(0.0, 0.0, 5.0, 5.0));
        // Cached views are still registered and hear about teardown too.
        let cached = add(&mut win, root, Probe::new(&log), Rect::new(0.0, 0.0, 5.0, 5.0));
        win.remove_child(root, cached, true).unwrap();
        assert!(win.tree().is_device_listener(a));
        drop(win);
        let teardowns = log
            .borrow()
            .iter()
            .filter(|c| **c == Call::Device(DeviceChange::Teardown))
            .count();
        assert_eq!(teardowns, 2);
    }
}
