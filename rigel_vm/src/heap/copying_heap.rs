// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The two banks of the heap. The mutable arena is a pair of semispaces
//! managed by a Cheney-style copying collector; the constant arena is
//! bump-allocated and never collected, holding interned strings and
//! bootstrap-time constants that the collector may treat as immovable.

use core::ptr::NonNull;
use std::alloc::{Layout, alloc_zeroed, dealloc};

use crate::engine::value::Value;
use crate::heap::trace;

/// Default sizes, overridable through [`HeapOptions`]; tests use small
/// arenas to force frequent collections.
const MUTABLE_SPACE_SIZE: usize = 512 * 1024 * 1024;
const CONSTANT_SPACE_SIZE: usize = 10 * 1024 * 1024;

/// Allocation granule. Every object size is rounded up to this, which also
/// keeps the low three pointer bits clear for the value encoding.
const ALIGNMENT: usize = 8;

#[inline]
pub(crate) fn round_size(size: usize) -> usize {
    (size + ALIGNMENT - 1) & !(ALIGNMENT - 1)
}

type ForwardingMap = hashbrown::HashMap<usize, usize, ahash::RandomState>;

#[derive(Debug, Clone, Copy)]
pub struct HeapOptions {
    /// Total size of the mutable arena; each semispace gets half.
    pub mutable_size: usize,
    /// Size of the never-collected constant arena.
    pub constant_size: usize,
}

impl Default for HeapOptions {
    fn default() -> Self {
        HeapOptions {
            mutable_size: MUTABLE_SPACE_SIZE,
            constant_size: CONSTANT_SPACE_SIZE,
        }
    }
}

/// The mutable arena: `(from_space, to_space, alloc, extent)`.
struct CopyingSpace {
    block: NonNull<u8>,
    layout: Layout,
    extent: usize,
    /// The semispace new allocations bump into.
    from_space: *mut u8,
    /// The idle semispace; right after a collection it holds the stale
    /// copies of every evacuated object.
    to_space: *mut u8,
    alloc: *mut u8,
    forwarded: ForwardingMap,
}

impl CopyingSpace {
    fn new(total_size: usize) -> Self {
        let extent = round_size(total_size) / 2;
        let layout = Layout::from_size_align(extent * 2, ALIGNMENT).unwrap();
        // SAFETY: layout has non-zero size.
        let block = unsafe { alloc_zeroed(layout) };
        let block = NonNull::new(block).expect("failed to reserve the mutable heap arena");
        CopyingSpace {
            block,
            layout,
            extent,
            from_space: block.as_ptr(),
            to_space: unsafe { block.as_ptr().add(extent) },
            alloc: block.as_ptr(),
            forwarded: ForwardingMap::default(),
        }
    }

    #[inline]
    fn fits(&self, size: usize) -> bool {
        let requested = round_size(size);
        let used = self.alloc as usize - self.from_space as usize;
        used + requested <= self.extent
    }

    #[inline]
    fn allocate(&mut self, size: usize) -> NonNull<u8> {
        assert!(self.fits(size), "mutable heap space exhausted");
        let result = self.alloc;
        // SAFETY: fits() guarantees the bump stays inside the semispace.
        self.alloc = unsafe { self.alloc.add(round_size(size)) };
        unsafe { NonNull::new_unchecked(result) }
    }

    /// Runs a full collection. `roots` are the addresses of every live value
    /// slot outside the heap; each is rewritten in place as its referent
    /// moves.
    ///
    /// SAFETY: every pointer in `roots` must be valid for reads and writes,
    /// and the heap must contain no reachable pointer that is absent from
    /// the root set or from a traced object.
    unsafe fn collect(&mut self, roots: &[*mut Value]) {
        self.forwarded.clear();

        core::mem::swap(&mut self.from_space, &mut self.to_space);
        self.alloc = self.from_space;
        let mut scan = self.from_space;

        for &slot in roots {
            unsafe { self.evacuate(slot) };
        }

        // Cheney scan: every object copied into from_space has its outgoing
        // references evacuated in turn, until scan catches up with alloc.
        let mut slots: Vec<*mut Value> = Vec::new();
        while scan < self.alloc {
            slots.clear();
            unsafe { trace::value_slots(scan, &mut slots) };
            for &slot in &slots {
                unsafe { self.evacuate(slot) };
            }
            scan = unsafe { scan.add(round_size(trace::object_size(scan))) };
        }
    }

    /// Copies the referent of `slot` into the active semispace, or rewrites
    /// `slot` through the forwarding map when the referent already moved.
    /// Constant-arena referents (and anything else outside the evacuation
    /// source) are left untouched.
    unsafe fn evacuate(&mut self, slot: *mut Value) {
        let value = unsafe { *slot };
        if !value.is_heap_object() {
            return;
        }

        let addr = value.raw() as usize;
        let source = self.to_space as usize;
        if addr < source || addr >= source + self.extent {
            return;
        }

        if let Some(&forwarded) = self.forwarded.get(&addr) {
            unsafe { *slot = Value::from_raw(forwarded as u64) };
            return;
        }

        let size = unsafe { trace::object_size(addr as *mut u8) };
        let destination = self.alloc;
        debug_assert!(
            (destination as usize + round_size(size)) <= self.from_space as usize + self.extent
        );
        unsafe {
            core::ptr::copy_nonoverlapping(addr as *const u8, destination, size);
            self.alloc = destination.add(round_size(size));
            *slot = Value::from_raw(destination as u64);
        }
        self.forwarded.insert(addr, destination as usize);
    }
}

impl Drop for CopyingSpace {
    fn drop(&mut self) {
        // SAFETY: block was allocated with this layout in new().
        unsafe { dealloc(self.block.as_ptr(), self.layout) };
    }
}

/// The constant arena. Interned strings and bootstrap constants are bump
/// allocated here and never move, so raw references to them stay valid for
/// the lifetime of the heap.
struct BumpSpace {
    block: NonNull<u8>,
    layout: Layout,
    top: *mut u8,
    end: *mut u8,
}

impl BumpSpace {
    fn new(size: usize) -> Self {
        let size = round_size(size);
        let layout = Layout::from_size_align(size, ALIGNMENT).unwrap();
        // SAFETY: layout has non-zero size.
        let block = unsafe { alloc_zeroed(layout) };
        let block = NonNull::new(block).expect("failed to reserve the constant heap arena");
        BumpSpace {
            block,
            layout,
            top: block.as_ptr(),
            end: unsafe { block.as_ptr().add(size) },
        }
    }

    fn allocate(&mut self, size: usize) -> NonNull<u8> {
        let rounded = round_size(size);
        assert!(
            (self.top as usize) + rounded <= self.end as usize,
            "constant heap space exhausted"
        );
        let result = self.top;
        // SAFETY: bounds checked above.
        self.top = unsafe { self.top.add(rounded) };
        unsafe { NonNull::new_unchecked(result) }
    }
}

impl Drop for BumpSpace {
    fn drop(&mut self) {
        // SAFETY: block was allocated with this layout in new().
        unsafe { dealloc(self.block.as_ptr(), self.layout) };
    }
}

/// The full heap: the collected mutable arena plus the constant arena.
pub struct Heap {
    mutable: CopyingSpace,
    constant: BumpSpace,
    collection_count: u64,
}

impl Heap {
    pub fn new(options: HeapOptions) -> Self {
        Heap {
            mutable: CopyingSpace::new(options.mutable_size),
            constant: BumpSpace::new(options.constant_size),
            collection_count: 0,
        }
    }

    /// Whether an allocation of `size` fits without collecting first.
    #[inline]
    pub(crate) fn fits(&self, size: usize) -> bool {
        self.mutable.fits(size)
    }

    /// Bump-allocates in the mutable arena. The caller (the agent's
    /// allocation entry point) has already collected if necessary; running
    /// out of space here is fatal.
    #[inline]
    pub(crate) fn allocate(&mut self, size: usize) -> NonNull<u8> {
        self.mutable.allocate(size)
    }

    /// Bump-allocates in the constant arena. Constant objects never move
    /// and are never reclaimed.
    #[inline]
    pub(crate) fn allocate_constant(&mut self, size: usize) -> NonNull<u8> {
        self.constant.allocate(size)
    }

    /// SAFETY: see [`CopyingSpace::collect`].
    pub(crate) unsafe fn collect(&mut self, roots: &[*mut Value]) {
        unsafe { self.mutable.collect(roots) };
        self.collection_count += 1;
    }

    /// Number of collections run so far; exercised by the GC test suite.
    pub fn collection_count(&self) -> u64 {
        self.collection_count
    }

    /// Bytes currently in use in the mutable arena.
    pub fn used_bytes(&self) -> usize {
        self.mutable.alloc as usize - self.mutable.from_space as usize
    }
}
