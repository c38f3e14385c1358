// Copyright 2025 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A tour of one window: clicks, focus, a pop-up, an animation, and a lost device.
//!
//! The device below only logs what it is asked to draw, so the demo runs anywhere.
//!
//! Run:
//! - `RUST_LOG=debug cargo run -p thicket_demos --example window_tour`

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use kurbo::{Affine, Rect, RoundedRect, Size};
use log::info;
use thicket_view::{
    AnimationHandle, Background, Bitmap, Border, Color, Device, DeviceChange, DeviceError,
    EventCx, Image, Key, KeyEvent, Navigation, Plain, PointerEvent, RenderTarget, Session, Tween,
    ViewFlags, ViewId, Widget, Window, WindowConfig,
};

/// Counts draw calls per frame.
#[derive(Default)]
struct LogTarget {
    epoch: u64,
    fills: usize,
    strokes: usize,
    next_bitmap: u64,
}

impl RenderTarget for LogTarget {
    fn set_transform(&mut self, _transform: Affine) {}

    fn push_clip(&mut self, _clip: RoundedRect) {}

    fn pop_clip(&mut self) {}

    fn fill(&mut self, shape: RoundedRect, color: Color) {
        self.fills += 1;
        log::trace!("fill {:?} {color:?}", shape.rect());
    }

    fn stroke(&mut self, shape: RoundedRect, _color: Color, width: f64) {
        self.strokes += 1;
        log::trace!("stroke {:?} width {width}", shape.rect());
    }

    fn create_bitmap(&mut self, image: &Image) -> Option<Bitmap> {
        self.next_bitmap += 1;
        Some(Bitmap::new(
            self.next_bitmap,
            self.epoch,
            image.width,
            image.height,
        ))
    }

    fn draw_bitmap(&mut self, _bitmap: &Bitmap, _dest: Rect) {}
}

struct LogDevice {
    target: LogTarget,
    lose_next: Rc<Cell<bool>>,
}

impl Device for LogDevice {
    fn begin_frame(&mut self) -> Result<&mut dyn RenderTarget, DeviceError> {
        if self.lose_next.replace(false) {
            return Err(DeviceError::Lost);
        }
        self.target.fills = 0;
        self.target.strokes = 0;
        Ok(&mut self.target)
    }

    fn end_frame(&mut self) -> Result<(), DeviceError> {
        info!(
            "frame presented: {} fills, {} strokes",
            self.target.fills, self.target.strokes
        );
        Ok(())
    }

    fn recreate(&mut self) -> Result<(), DeviceError> {
        self.target.epoch += 1;
        info!("device recreated at epoch {}", self.target.epoch);
        Ok(())
    }

    fn resize(&mut self, size: Size) -> Result<(), DeviceError> {
        info!("surface resized to {size:?}");
        Ok(())
    }

    fn epoch(&self) -> u64 {
        self.target.epoch
    }
}

/// A button that reports focus changes.
struct Button(&'static str);

impl Widget for Button {
    fn on_focus_changed(&mut self, _cx: &mut EventCx<'_>, focused: bool) {
        info!("{} focused: {focused}", self.0);
    }

    fn on_device_change(&mut self, change: DeviceChange) {
        info!("{} released device resources: {change:?}", self.0);
    }
}

fn button(window: &mut Window, label: &'static str, frame: Rect) -> ViewId {
    let id = window.tree_mut().create_element(Button(label));
    let root = window.root();
    if let Err(err) = window.add_view(root, id, None) {
        log::error!("could not add {label}: {err}");
    }
    let tree = window.tree_mut();
    tree.set_layout_info(id, frame.x0, frame.y0, frame.width(), frame.height());
    tree.add_flags(id, ViewFlags::CLICKABLE | ViewFlags::FOCUSABLE);
    if let Some(data) = tree.element_mut(id) {
        data.set_background(Background::Color(Color::rgb(40, 90, 160)));
        data.set_border(Some(Border::new(Color::WHITE, 1.0)));
        data.set_corner_radii(4.0);
    }
    id
}

fn main() -> Result<(), DeviceError> {
    env_logger::init();

    let lose_next = Rc::new(Cell::new(false));
    let device = LogDevice {
        target: LogTarget {
            epoch: 1,
            ..LogTarget::default()
        },
        lose_next: lose_next.clone(),
    };
    let mut window = Window::new(
        device,
        Session::default(),
        Size::new(320.0, 240.0),
        WindowConfig::default(),
    );

    let ok = button(&mut window, "ok", Rect::new(20.0, 180.0, 120.0, 220.0));
    let cancel = button(&mut window, "cancel", Rect::new(140.0, 180.0, 240.0, 220.0));

    let clicks = Rc::new(Cell::new(0_u32));
    let counter = clicks.clone();
    window.set_on_click(ok, move |_, id| {
        counter.set(counter.get() + 1);
        info!("clicked {id:?}");
    });
    window.set_on_click(cancel, |window, _| {
        info!("cancel: dropping focus");
        window.set_focus(None);
    });

    window.paint(0)?;

    // Press and release on "ok".
    window.handle_pointer(PointerEvent::down((50.0, 200.0), 10));
    window.handle_pointer(PointerEvent::up((52.0, 201.0), 60));
    info!("ok clicked {} time(s)", clicks.get());

    // Keyboard: Tab moves focus, Enter clicks.
    window.move_focus(Navigation::Next);
    window.handle_key(KeyEvent::press(Key::Enter));
    info!("focus is on {:?}", window.focus());

    // A pop-up is dismissed by the next press outside of it.
    let popup = window.tree_mut().create_layout(Plain);
    window.tree_mut().add_flags(popup, ViewFlags::POPUP);
    window
        .tree_mut()
        .set_layout_info(popup, 60.0, 40.0, 200.0, 100.0);
    if let Err(err) = window.show_popup(popup) {
        log::error!("could not show the pop-up: {err}");
    }
    window.handle_pointer(PointerEvent::down((5.0, 5.0), 100));
    window.handle_pointer(PointerEvent::up((5.0, 5.0), 120));
    info!("pop-up after outside press: {:?}", window.popup());

    // Slide "cancel" in over a quarter second.
    let slide = Rc::new(RefCell::new(Tween::new(
        Affine::translate((0.0, 40.0)),
        Affine::IDENTITY,
        250,
    )));
    window.set_animation(cancel, Some(AnimationHandle::new(&slide)));
    let mut now = 200;
    loop {
        window.paint(now)?;
        if !window.has_running_animations() {
            break;
        }
        now += 50;
    }
    info!("animation settled at {now} ms");

    // The next frame finds the device lost; the window recovers on its own.
    lose_next.set(true);
    window.paint(now)?;

    window.resize(Size::new(480.0, 320.0))?;
    window.paint(now + 16)?;
    Ok(())
}
