// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::Bounds;

/// The default number of regions a container can hold.
pub const DEFAULT_REGION_COUNT: usize = 6;

/// A bounded set of changed regions.
///
/// Intersecting regions are always merged. When the container is full,
/// a new region is merged with the pair that grows the covered area the least.
#[derive(Clone, PartialEq, Debug)]
pub struct DirtyRegionContainer {
    regions: Vec<Bounds>,
    capacity: usize,
}

impl DirtyRegionContainer {
    /// Creates a new container.
    ///
    /// Capacity is at least 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        DirtyRegionContainer {
            regions: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Returns the maximum number of regions.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of regions.
    #[inline]
    pub fn size(&self) -> usize {
        self.regions.len()
    }

    /// Checks that there are no regions.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Returns a region.
    ///
    /// # Panics
    ///
    /// When `index` is not lower than `size()`.
    #[inline]
    pub fn region(&self, index: usize) -> Bounds {
        self.regions[index]
    }

    /// Replaces a region.
    ///
    /// # Panics
    ///
    /// When `index` is not lower than `size()`.
    #[inline]
    pub fn set_region(&mut self, index: usize, region: Bounds) {
        self.regions[index] = region;
    }

    /// Returns all regions.
    #[inline]
    pub fn regions(&self) -> &[Bounds] {
        &self.regions
    }

    /// Returns a box covering all regions.
    pub fn union_bounds(&self) -> Bounds {
        self.regions
            .iter()
            .fold(Bounds::EMPTY, |acc, r| acc.union(r))
    }

    /// Removes all regions.
    #[inline]
    pub fn reset(&mut self) {
        self.regions.clear();
    }

    /// Adds a region.
    ///
    /// Empty regions are ignored.
    pub fn add_dirty_region(&mut self, region: Bounds) {
        if region.is_empty() {
            return;
        }

        // Absorb everything the region touches. Absorbing can make the region
        // reach others, so repeat until nothing changes.
        let mut region = region;
        loop {
            let before = self.regions.len();
            let mut i = 0;
            while i < self.regions.len() {
                if self.regions[i].intersects(&region) {
                    region = region.union(&self.regions.swap_remove(i));
                } else {
                    i += 1;
                }
            }

            if self.regions.len() == before {
                break;
            }
        }

        if self.regions.len() < self.capacity {
            self.regions.push(region);
        } else if self.capacity == 1 {
            self.regions[0] = self.regions[0].union(&region);
        } else {
            self.compress(region);
        }
    }

    /// Merges the pair of regions, including the new one,
    /// whose union adds the least area.
    fn compress(&mut self, region: Bounds) {
        let n = self.regions.len();
        let get = |regions: &[Bounds], i: usize| if i == n { region } else { regions[i] };

        let mut best = (0, 1);
        let mut best_cost = f32::INFINITY;
        for i in 0..=n {
            for j in i + 1..=n {
                let a = get(&self.regions, i);
                let b = get(&self.regions, j);
                let cost = area(&a.union(&b)) - area(&a) - area(&b);
                if cost < best_cost {
                    best_cost = cost;
                    best = (i, j);
                }
            }
        }

        let (i, j) = best;
        let merged = get(&self.regions, i).union(&get(&self.regions, j));
        if j == n {
            self.regions[i] = merged;
        } else {
            self.regions[i] = merged;
            self.regions[j] = region;
        }
    }

    /// Adds all regions of another container.
    pub fn merge(&mut self, other: &DirtyRegionContainer) {
        for region in &other.regions {
            self.add_dirty_region(*region);
        }
    }

    /// Grows every region.
    pub fn grow(&mut self, h: f32, v: f32) {
        for region in &mut self.regions {
            *region = region.grow(h, v);
        }

        self.normalize();
    }

    /// Translates every region.
    pub fn translate(&mut self, dx: f32, dy: f32) {
        for region in &mut self.regions {
            *region = region.translate(dx, dy);
        }
    }

    /// Clips every region, dropping the ones that end up empty.
    pub fn intersect(&mut self, clip: &Bounds) {
        for region in &mut self.regions {
            *region = region.intersect(clip);
        }

        self.regions.retain(|r| !r.is_empty());
    }

    /// Re-adds all regions, merging the ones that overlap after a change.
    pub(crate) fn normalize(&mut self) {
        let regions = std::mem::take(&mut self.regions);
        for region in regions {
            self.add_dirty_region(region);
        }
    }
}

fn area(b: &Bounds) -> f32 {
    b.width() * b.height()
}

/// A pool of dirty region containers.
#[derive(Debug)]
pub struct DirtyRegionPool {
    free: Vec<DirtyRegionContainer>,
    count: usize,
}

impl Default for DirtyRegionPool {
    fn default() -> Self {
        DirtyRegionPool::new(DEFAULT_REGION_COUNT)
    }
}

impl DirtyRegionPool {
    /// Creates a pool of containers with the provided capacity.
    pub fn new(count: usize) -> Self {
        DirtyRegionPool {
            free: Vec::new(),
            count,
        }
    }

    /// Creates a pool using `Options::dirty_region_count`.
    pub fn from_options(opt: &crate::Options) -> Self {
        DirtyRegionPool::new(opt.dirty_region_count)
    }

    /// Returns an empty container.
    pub fn check_out(&mut self) -> DirtyRegionContainer {
        match self.free.pop() {
            Some(mut c) => {
                c.reset();
                c
            }
            None => DirtyRegionContainer::new(self.count),
        }
    }

    /// Returns a container back to the pool.
    pub fn check_in(&mut self, container: DirtyRegionContainer) {
        if container.capacity() == self.count.max(1) {
            self.free.push(container);
        }
    }

    /// Returns the number of idle containers.
    #[inline]
    pub fn idle(&self) -> usize {
        self.free.len()
    }
}
