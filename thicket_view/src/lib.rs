// Copyright 2025 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Thicket View: the retained view tree at the core of the Thicket toolkit.
//!
//! A [`Window`] owns a [`ViewTree`] of elements and containers, a graphics [`Device`], and
//! the per-window input state. The shell forwards size, paint, device, pointer and key
//! messages into the window; nothing else drives the tree.
//!
//! ## Views
//!
//! Every view is an arena slot addressed by a generational [`ViewId`]. A view carries
//! [`ElementData`] (layout box, flags, style, background, border, visual transform, animation
//! reference) and a boxed [`Widget`] holding its behavior. Containers add an ordered child
//! sequence: the last child paints last, is hit first, and carries [`ViewFlags::FRONT`].
//! Removed children can be parked in a reuse cache instead of being destroyed.
//!
//! ## Boxes and matrices
//!
//! Layout is push-based: [`ViewTree::set_layout_info`] clamps the size into the view's
//! limits, stores it, and runs [`Widget::on_layout`], which by default re-applies each
//! child's own box. The visual transform is kept apart from the box:
//!
//! - the local matrix composes scale, then rotation, then translation ([`TransformDelta`]);
//! - the absolute matrix is the parent's paint matrix, then the layout offset, then the
//!   local matrix;
//! - the paint matrix adds the view's animation on top.
//!
//! Hit testing maps the device point through the inverse of the paint matrix. A matrix that
//! cannot be inverted means "no hit", never a guess.
//!
//! ## Painting and the device
//!
//! Painting borrows the device's [`RenderTarget`] for one frame. Elements keep device
//! resources only as epoch-tagged [`Bitmap`] handles; on device loss, resize or teardown the
//! window broadcasts a [`DeviceChange`] to every registered view, and handles are recreated
//! lazily on the next paint. Skinning goes through the [`Session`]'s [`Theme`], resources
//! through its [`ResourceManager`].
//!
//! ## Input
//!
//! See [`Window`] for routing: event target pinning, deferred clicks, hover, focus and
//! pop-up dismissal. Propagation paths come from `thicket_responder`, press recognition and
//! the deferred click queue from `thicket_event_state`, focus traversal from `thicket_focus`.
//!
//! ```rust
//! use kurbo::Size;
//! # use thicket_view::{Device, DeviceError, RenderTarget};
//! use thicket_view::{Plain, PointerEvent, Session, ViewFlags, Window, WindowConfig};
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
//! let button = window.tree_mut().create_element(Plain);
//! window.add_view(window.root(), button, None).unwrap();
//! window.tree_mut().set_layout_info(button, 10.0, 10.0, 80.0, 30.0);
//! window.tree_mut().add_flags(button, ViewFlags::CLICKABLE);
//!
//! let clicked = std::rc::Rc::new(std::cell::Cell::new(false));
//! let flag = clicked.clone();
//! window.set_on_click(button, move |_, _| flag.set(true));
//!
//! window.handle_pointer(PointerEvent::down((20.0, 20.0), 0));
//! window.handle_pointer(PointerEvent::up((21.0, 20.0), 50));
//! assert!(clicked.get());
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod adapter;
mod animation;
mod damage;
mod device;
mod element;
mod error;
mod event;
mod layout;
mod paint;
mod session;
mod transform;
mod tree;
mod types;
mod widget;
mod window;

#[cfg(test)]
mod testing;

pub use adapter::{Adapter, AdapterView, CancelToken, DataSetObserver, LoadTicket};
pub use animation::{Animation, AnimationHandle, Tween};
pub use damage::Damage;
pub use device::{Bitmap, Color, Device, DeviceChange, Image, RenderTarget};
pub use element::{Background, Border, ElementData, MAX_BORDER_WIDTH};
pub use error::{DeviceError, TreeError};
pub use event::{Key, KeyEvent, PRIMARY_BUTTON, PointerEvent, PointerEventKind};
pub use layout::LayoutBox;
pub use session::{CustomBrush, Layer, NoResources, PlainTheme, ResourceManager, Session, Theme};
pub use transform::TransformDelta;
pub use tree::ViewTree;
pub use types::{Style, ViewFlags, ViewId};
pub use widget::{DrawCx, EventCx, Plain, Widget};
pub use window::{ClickListener, RepaintStrategy, Window, WindowConfig};

pub use thicket_focus::{Navigation, WrapMode};
