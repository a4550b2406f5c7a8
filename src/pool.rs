// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::collections::VecDeque;

/// Image pool counters.
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub struct PoolStats {
    /// Buffers allocated by the pool.
    pub created: usize,
    /// Checkouts served from the free list.
    pub reused: usize,
    /// Buffers returned to the free list.
    pub returned: usize,
    /// Buffers freed instead of being kept.
    pub discarded: usize,
    /// Buffers checked out and not returned yet.
    pub outstanding: usize,
}

/// A pool of pixel buffers.
///
/// Buffers are reused only when dimensions match exactly.
/// The free list keeps at most `capacity` buffers, dropping the oldest one first.
pub(crate) struct ImagePool {
    free: VecDeque<tiny_skia::Pixmap>,
    capacity: usize,
    stats: PoolStats,
}

impl ImagePool {
    pub fn new(capacity: usize) -> Self {
        ImagePool {
            free: VecDeque::new(),
            capacity,
            stats: PoolStats::default(),
        }
    }

    pub fn stats(&self) -> PoolStats {
        self.stats
    }

    /// Returns a transparent buffer of the requested size.
    pub fn check_out(&mut self, width: u32, height: u32) -> Option<tiny_skia::Pixmap> {
        let idx = self
            .free
            .iter()
            .position(|p| p.width() == width && p.height() == height);

        let pixmap = match idx.and_then(|idx| self.free.remove(idx)) {
            Some(mut pixmap) => {
                pixmap.fill(tiny_skia::Color::TRANSPARENT);
                self.stats.reused += 1;
                log::trace!("Reused a {}x{} buffer.", width, height);
                pixmap
            }
            None => {
                let pixmap = tiny_skia::Pixmap::new(width, height)?;
                self.stats.created += 1;
                log::trace!("Allocated a {}x{} buffer.", width, height);
                pixmap
            }
        };

        self.stats.outstanding += 1;
        Some(pixmap)
    }

    /// Puts a buffer back on the free list.
    pub fn check_in(&mut self, pixmap: tiny_skia::Pixmap) {
        self.stats.outstanding = self.stats.outstanding.saturating_sub(1);

        if self.capacity == 0 {
            self.stats.discarded += 1;
            return;
        }

        self.stats.returned += 1;
        self.free.push_back(pixmap);
        while self.free.len() > self.capacity {
            self.free.pop_front();
            self.stats.discarded += 1;
        }
    }

    /// Accounts for a checked out buffer that is freed instead of being returned.
    pub fn discard(&mut self) {
        self.stats.outstanding = self.stats.outstanding.saturating_sub(1);
        self.stats.discarded += 1;
    }

    /// Frees all buffers on the free list.
    pub fn clear(&mut self) {
        self.stats.discarded += self.free.len();
        self.free.clear();
    }
}
