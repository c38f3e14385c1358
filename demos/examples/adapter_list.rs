// Copyright 2025 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A long list that realizes only visible rows and loads row data on a worker thread.
//!
//! Each scroll that changes the visible range issues a new load ticket and cancels the
//! previous one. Results for stale tickets are dropped on the UI thread.
//!
//! Run:
//! - `RUST_LOG=trace cargo run -p thicket_demos --example adapter_list`

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use kurbo::{Affine, Rect, RoundedRect, Size};
use log::{debug, info};
use thicket_view::{
    Adapter, AdapterView, Background, Bitmap, Color, Device, DeviceError, Image, LoadTicket,
    Plain, RenderTarget, Session, ViewId, Window, WindowConfig,
};

struct NullTarget;

impl RenderTarget for NullTarget {
    fn set_transform(&mut self, _transform: Affine) {}
    fn push_clip(&mut self, _clip: RoundedRect) {}
    fn pop_clip(&mut self) {}
    fn fill(&mut self, _shape: RoundedRect, _color: Color) {}
    fn stroke(&mut self, _shape: RoundedRect, _color: Color, _width: f64) {}
    fn create_bitmap(&mut self, _image: &Image) -> Option<Bitmap> {
        None
    }
    fn draw_bitmap(&mut self, _bitmap: &Bitmap, _dest: Rect) {}
}

struct NullDevice(NullTarget);

impl Device for NullDevice {
    fn begin_frame(&mut self) -> Result<&mut dyn RenderTarget, DeviceError> {
        Ok(&mut self.0)
    }
    fn end_frame(&mut self) -> Result<(), DeviceError> {
        Ok(())
    }
    fn recreate(&mut self) -> Result<(), DeviceError> {
        Ok(())
    }
    fn resize(&mut self, _size: Size) -> Result<(), DeviceError> {
        Ok(())
    }
    fn epoch(&self) -> u64 {
        1
    }
}

/// Rows whose shade arrives from the loader; unloaded rows are grey.
struct Shades {
    shades: Vec<Option<u8>>,
}

impl Adapter for Shades {
    fn count(&self) -> usize {
        self.shades.len()
    }

    fn bind_view(
        &mut self,
        window: &mut Window,
        index: usize,
        recycled: Option<ViewId>,
    ) -> Option<ViewId> {
        let view = recycled.unwrap_or_else(|| window.tree_mut().create_element(Plain));
        let color = match self.shades.get(index).copied().flatten() {
            Some(shade) => Color::rgb(shade, shade, 255),
            None => Color::rgb(128, 128, 128),
        };
        let data = window.tree_mut().element_mut(view)?;
        data.set_tag(index as u64);
        data.set_background(Background::Color(color));
        Some(view)
    }
}

/// Load a ticket's rows, checking for cancellation between rows.
fn spawn_loader(ticket: LoadTicket, results: mpsc::Sender<(LoadTicket, Vec<(usize, u8)>)>) {
    thread::spawn(move || {
        let mut rows = Vec::new();
        for index in ticket.range() {
            if ticket.cancel_token().is_cancelled() {
                debug!("load {} cancelled at row {index}", ticket.generation());
                return;
            }
            thread::sleep(Duration::from_millis(2));
            #[allow(
                clippy::cast_possible_truncation,
                reason = "the shade wraps on purpose"
            )]
            rows.push((index, (index * 7) as u8));
        }
        // The UI side may have quit already.
        let _ = results.send((ticket, rows));
    });
}

fn main() -> Result<(), DeviceError> {
    env_logger::init();

    let mut window = Window::new(
        NullDevice(NullTarget),
        Session::default(),
        Size::new(240.0, 400.0),
        WindowConfig::default(),
    );
    let root = window.root();
    let adapter = Shades {
        shades: vec![None; 10_000],
    };
    let mut list = match AdapterView::new(&mut window, root, adapter, 24.0, 48.0) {
        Ok(list) => list,
        Err(err) => {
            log::error!("could not create the list: {err}");
            return Ok(());
        }
    };

    let (tx, rx) = mpsc::channel();
    if let Some(ticket) = list.set_frame(&mut window, Rect::new(0.0, 0.0, 240.0, 400.0)) {
        spawn_loader(ticket, tx.clone());
    }
    info!("{} rows realized", list.realized().count());

    // Fling through the list; most of these loads are cancelled before they finish.
    for step in 0..20 {
        if let Some(ticket) = list.scroll_by(&mut window, 150.0) {
            spawn_loader(ticket, tx.clone());
        }
        if step % 5 == 0 {
            window.paint(step)?;
        }
    }
    drop(tx);

    let mut applied = 0;
    for (ticket, rows) in rx {
        let accepted = list.complete_load(&mut window, &ticket, |shades| {
            for (index, shade) in rows {
                if let Some(slot) = shades.shades.get_mut(index) {
                    *slot = Some(shade);
                }
            }
        });
        if accepted {
            applied += 1;
        }
    }
    window.paint(100)?;
    info!(
        "applied {applied} load(s); offset {}, {} rows realized, {} views cached",
        list.scroll_offset(),
        list.realized().count(),
        window.tree().cached_children(list.container()).len()
    );
    Ok(())
}
