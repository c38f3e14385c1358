// Copyright 2025 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Test doubles: a recording device, an in-memory resource manager, and probe widgets.

use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::RefCell;

use hashbrown::HashMap;
use kurbo::{Affine, Rect, RoundedRect, Size};

use crate::{
    Bitmap, Color, Device, DeviceChange, DeviceError, EventCx, Image, Key, KeyEvent,
    PointerEvent, PointerEventKind, RenderTarget, ResourceManager, ViewId, Widget,
};

/// One recorded render target call.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Op {
    SetTransform(Affine),
    PushClip(RoundedRect),
    PopClip,
    Fill(RoundedRect, Color),
    Stroke(RoundedRect, Color, f64),
    CreateBitmap(Bitmap),
    DrawBitmap(Bitmap, Rect),
}

/// Shared state behind [`RecordingDevice`], inspectable after the window took the device.
#[derive(Debug, Default)]
pub(crate) struct DeviceLog {
    pub(crate) ops: Vec<Op>,
    pub(crate) epoch: u64,
    pub(crate) frames: u32,
    pub(crate) next_bitmap: u64,
    /// The next `begin_frame` reports a lost device.
    pub(crate) lose_next_frame: bool,
    /// `recreate` fails while set.
    pub(crate) fail_recreate: bool,
    pub(crate) resized: Option<Size>,
}

pub(crate) struct RecordingTarget {
    log: Rc<RefCell<DeviceLog>>,
}

impl RecordingTarget {
    pub(crate) fn new(log: Rc<RefCell<DeviceLog>>) -> Self {
        Self { log }
    }

    fn record(&mut self, op: Op) {
        self.log.borrow_mut().ops.push(op);
    }
}

impl RenderTarget for RecordingTarget {
    fn set_transform(&mut self, transform: Affine) {
        self.record(Op::SetTransform(transform));
    }

    fn push_clip(&mut self, clip: RoundedRect) {
        self.record(Op::PushClip(clip));
    }

    fn pop_clip(&mut self) {
        self.record(Op::PopClip);
    }

    fn fill(&mut self, shape: RoundedRect, color: Color) {
        self.record(Op::Fill(shape, color));
    }

    fn stroke(&mut self, shape: RoundedRect, color: Color, width: f64) {
        self.record(Op::Stroke(shape, color, width));
    }

    fn create_bitmap(&mut self, image: &Image) -> Option<Bitmap> {
        let mut log = self.log.borrow_mut();
        log.next_bitmap += 1;
        let bitmap = Bitmap::new(log.next_bitmap, log.epoch, image.width, image.height);
        log.ops.push(Op::CreateBitmap(bitmap));
        Some(bitmap)
    }

    fn draw_bitmap(&mut self, bitmap: &Bitmap, dest: Rect) {
        self.record(Op::DrawBitmap(*bitmap, dest));
    }
}

pub(crate) struct RecordingDevice {
    log: Rc<RefCell<DeviceLog>>,
    target: RecordingTarget,
}

impl RecordingDevice {
    /// A device at epoch 1 and a handle to its log.
    pub(crate) fn new() -> (Self, Rc<RefCell<DeviceLog>>) {
        let log = Rc::new(RefCell::new(DeviceLog {
            epoch: 1,
            ..DeviceLog::default()
        }));
        let device = Self {
            log: log.clone(),
            target: RecordingTarget::new(log.clone()),
        };
        (device, log)
    }
}

impl Device for RecordingDevice {
    fn begin_frame(&mut self) -> Result<&mut dyn RenderTarget, DeviceError> {
        let mut log = self.log.borrow_mut();
        if log.lose_next_frame {
            log.lose_next_frame = false;
            return Err(DeviceError::Lost);
        }
        log.frames += 1;
        drop(log);
        Ok(&mut self.target)
    }

    fn end_frame(&mut self) -> Result<(), DeviceError> {
        Ok(())
    }

    fn recreate(&mut self) -> Result<(), DeviceError> {
        let mut log = self.log.borrow_mut();
        if log.fail_recreate {
            return Err(DeviceError::Unavailable);
        }
        log.epoch += 1;
        Ok(())
    }

    fn resize(&mut self, size: Size) -> Result<(), DeviceError> {
        self.log.borrow_mut().resized = Some(size);
        Ok(())
    }

    fn epoch(&self) -> u64 {
        self.log.borrow().epoch
    }
}

#[derive(Debug, Default)]
pub(crate) struct MemoryResources {
    images: HashMap<String, Rc<Image>>,
}

impl MemoryResources {
    pub(crate) fn insert(&mut self, key: &str, image: Image) {
        self.images.insert(key.into(), Rc::new(image));
    }
}

impl ResourceManager for MemoryResources {
    fn image(&self, key: &str) -> Option<Rc<Image>> {
        self.images.get(key).cloned()
    }
}

/// A callback observed by a [`Probe`].
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Call {
    Pointer(ViewId, PointerEventKind),
    Key(ViewId, Key),
    Click(ViewId),
    LongClick(ViewId),
    Focus(ViewId, bool),
    Device(DeviceChange),
}

pub(crate) type CallLog = Rc<RefCell<Vec<Call>>>;

/// A widget that records its callbacks and optionally consumes input.
#[derive(Default)]
pub(crate) struct Probe {
    pub(crate) log: CallLog,
    pub(crate) consume_pointer: bool,
    pub(crate) consume_keys: bool,
}

impl Probe {
    pub(crate) fn new(log: &CallLog) -> Self {
        Self {
            log: log.clone(),
            ..Self::default()
        }
    }

    pub(crate) fn consuming(log: &CallLog) -> Self {
        Self {
            consume_pointer: true,
            ..Self::new(log)
        }
    }
}

impl Widget for Probe {
    fn on_pointer(&mut self, cx: &mut EventCx<'_>, event: &PointerEvent) -> bool {
        self.log.borrow_mut().push(Call::Pointer(cx.id(), event.kind));
        self.consume_pointer
    }

    fn on_key(&mut self, cx: &mut EventCx<'_>, event: &KeyEvent) -> bool {
        self.log.borrow_mut().push(Call::Key(cx.id(), event.key));
        self.consume_keys
    }

    fn on_click(&mut self, cx: &mut EventCx<'_>) {
        self.log.borrow_mut().push(Call::Click(cx.id()));
    }

    fn on_long_click(&mut self, cx: &mut EventCx<'_>) {
        self.log.borrow_mut().push(Call::LongClick(cx.id()));
    }

    fn on_focus_changed(&mut self, cx: &mut EventCx<'_>, focused: bool) {
        self.log.borrow_mut().push(Call::Focus(cx.id(), focused));
    }

    fn on_device_change(&mut self, change: DeviceChange) {
        self.log.borrow_mut().push(Call::Device(change));
    }
}
