//! The open-addressing table.
//!
//! All entries live in one flat array obtained from the table's allocator.
//! Slot positions come from the probe bits of each entry's [`Signature`],
//! and collisions are resolved by triangular probing: the i-th probe lands
//! `i(i+1)/2` slots past the home slot. With a power-of-two capacity that
//! sequence visits every slot exactly once in `capacity` probes.

#![allow(unsafe_code)]

use std::alloc::Layout;
use std::borrow::Borrow;
use std::fmt;
use std::marker::PhantomData;
use std::mem::{self, MaybeUninit};
use std::ptr::{self, NonNull};
use std::slice;

use quarry_core::{Allocator, SystemAllocator};

use crate::error::TableError;
use crate::hash::{Fnv1a, KeyHasher};
use crate::iter::{Iter, IterMut};
use crate::signature::Signature;

/// Grow once an insert would push occupancy to this percentage.
pub const LOAD_FACTOR_PERCENT: usize = 70;

/// Capacity of the first entry array.
pub const MIN_CAPACITY: usize = 8;

/// One slot. `key` and `value` are initialized exactly when `signature` is
/// occupied. An all-zero slot is a valid empty slot.
pub(crate) struct Entry<K, V> {
    pub(crate) signature: Signature,
    pub(crate) key: MaybeUninit<K>,
    pub(crate) value: MaybeUninit<V>,
}

impl<K, V> Entry<K, V> {
    /// # Safety
    ///
    /// The slot must be occupied.
    #[inline]
    pub(crate) unsafe fn pair(&self) -> (&K, &V) {
        // SAFETY: occupied slots hold an initialized key and value.
        unsafe { (self.key.assume_init_ref(), self.value.assume_init_ref()) }
    }

    /// # Safety
    ///
    /// The slot must be occupied.
    #[inline]
    pub(crate) unsafe fn pair_mut(&mut self) -> (&K, &mut V) {
        // SAFETY: occupied slots hold an initialized key and value.
        unsafe { (self.key.assume_init_ref(), self.value.assume_init_mut()) }
    }
}

/// Where a key lives, or where it would go.
enum Slot {
    Occupied(usize),
    Vacant(usize, Signature),
}

/// A hash table mapping `K` to `V`, storing its entries in memory from `A`.
///
/// The table starts with no allocation and grows geometrically once the
/// load factor reaches [`LOAD_FACTOR_PERCENT`]. Removals leave tombstones
/// behind; they are reused by later inserts and discarded whenever the
/// entry array is rebuilt.
///
/// Lookups accept any borrowed form `Q` of the key. `H` must hash `Q` and
/// `K` identically for keys that compare equal, as it does for the default
/// [`Fnv1a`] hasher with `String`/`str` and `Vec<u8>`/`[u8]`.
pub struct Table<K, V, H = Fnv1a, A: Allocator = SystemAllocator> {
    entries: NonNull<Entry<K, V>>,
    capacity: usize,
    count: usize,
    hasher: H,
    allocator: A,
    _marker: PhantomData<(K, V)>,
}

impl<K, V> Table<K, V> {
    /// An empty table on the system allocator with the default hasher.
    pub fn new() -> Self {
        Self::with_hasher_in(Fnv1a, SystemAllocator)
    }

    /// A table on the system allocator with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Result<Self, TableError> {
        Self::with_capacity_in(capacity, SystemAllocator)
    }
}

impl<K, V, H> Table<K, V, H> {
    /// An empty table on the system allocator hashing with `hasher`.
    pub fn with_hasher(hasher: H) -> Self {
        Self::with_hasher_in(hasher, SystemAllocator)
    }
}

impl<K, V, A: Allocator> Table<K, V, Fnv1a, A> {
    /// An empty table drawing its memory from `allocator`.
    pub fn new_in(allocator: A) -> Self {
        Self::with_hasher_in(Fnv1a, allocator)
    }

    /// A table drawing from `allocator` that can hold `capacity` entries
    /// before it needs to grow.
    pub fn with_capacity_in(capacity: usize, allocator: A) -> Result<Self, TableError> {
        let mut table = Self::new_in(allocator);
        table.reserve(capacity)?;
        Ok(table)
    }
}

impl<K, V, H, A: Allocator> Table<K, V, H, A> {
    /// An empty table hashing with `hasher` and drawing from `allocator`.
    /// Allocates nothing.
    pub fn with_hasher_in(hasher: H, allocator: A) -> Self {
        Self {
            entries: NonNull::dangling(),
            capacity: 0,
            count: 0,
            hasher,
            allocator,
            _marker: PhantomData,
        }
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.count
    }

    /// Whether the table holds no live entries.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Number of slots in the entry array. Zero until the first insert.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The key hasher.
    pub fn hasher(&self) -> &H {
        &self.hasher
    }

    /// The allocator the entry array comes from.
    pub fn allocator(&self) -> &A {
        &self.allocator
    }

    /// Iterate over `(key, value)` pairs in slot order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(self.slots(), self.count)
    }

    /// Iterate over `(key, value)` pairs in slot order, with mutable values.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        let count = self.count;
        IterMut::new(self.slots_mut(), count)
    }

    /// The value stored for `key`.
    pub fn find<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
        H: KeyHasher<Q>,
    {
        let index = self.lookup(key)?;
        // SAFETY: `lookup` only returns occupied slots.
        Some(unsafe { self.slots()[index].pair().1 })
    }

    /// Mutable access to the value stored for `key`.
    pub fn find_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
        H: KeyHasher<Q>,
    {
        let index = self.lookup(key)?;
        // SAFETY: `lookup` only returns occupied slots.
        Some(unsafe { self.slots_mut()[index].pair_mut().1 })
    }

    /// Whether `key` has a live entry.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
        H: KeyHasher<Q>,
    {
        self.lookup(key).is_some()
    }

    /// Insert or overwrite the value for `key`, returning the stored value.
    ///
    /// When `key` is already present the old value is dropped and the
    /// passed key is discarded; the stored key is kept.
    pub fn upsert(&mut self, key: K, value: V) -> Result<&mut V, TableError>
    where
        K: Eq,
        H: KeyHasher<K>,
    {
        match self.claim(&key)? {
            Slot::Occupied(index) => {
                // SAFETY: `claim` returned an occupied slot.
                let (_, stored) = unsafe { self.slots_mut()[index].pair_mut() };
                *stored = value;
                Ok(stored)
            }
            Slot::Vacant(index, signature) => Ok(self.occupy(index, signature, key, value)),
        }
    }

    /// The value for `key`, inserting `V::default()` first if it is absent.
    pub fn get_or_insert_default(&mut self, key: K) -> Result<&mut V, TableError>
    where
        K: Eq,
        V: Default,
        H: KeyHasher<K>,
    {
        match self.claim(&key)? {
            // SAFETY: `claim` returned an occupied slot.
            Slot::Occupied(index) => Ok(unsafe { self.slots_mut()[index].pair_mut().1 }),
            Slot::Vacant(index, signature) => {
                let value = V::default();
                Ok(self.occupy(index, signature, key, value))
            }
        }
    }

    /// Remove `key`, dropping its key and value. Returns whether it was
    /// present.
    pub fn remove<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
        H: KeyHasher<Q>,
    {
        self.remove_entry(key).is_some()
    }

    /// Remove `key` and hand back the stored key and value.
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
        H: KeyHasher<Q>,
    {
        let index = self.lookup(key)?;
        let entry = &mut self.slots_mut()[index];
        entry.signature = Signature::TOMBSTONE;
        // SAFETY: the slot was occupied; the tombstone written above keeps
        // the moved-out key and value from being read or dropped again.
        let pair = unsafe { (entry.key.assume_init_read(), entry.value.assume_init_read()) };
        self.count -= 1;
        Some(pair)
    }

    /// Make room for `additional` more entries without further growth.
    pub fn reserve(&mut self, additional: usize) -> Result<(), TableError> {
        let needed = self
            .count
            .checked_add(additional)
            .ok_or(TableError::CapacityOverflow {
                requested: usize::MAX,
            })?;
        if needed == 0 {
            return Ok(());
        }
        let slots = needed
            .checked_mul(100)
            .map(|n| n / LOAD_FACTOR_PERCENT + 1)
            .ok_or(TableError::CapacityOverflow { requested: needed })?;
        if slots > self.capacity {
            self.grow(slots.max(MIN_CAPACITY))?;
        }
        Ok(())
    }

    /// Rebuild the entry array with at least `capacity` slots, rounded up to
    /// a power of two.
    ///
    /// Entries are re-placed by their cached signatures, so no key is
    /// rehashed, and tombstones are discarded. Growing to the current
    /// capacity is allowed and compacts away tombstones. On error the table
    /// is unchanged.
    ///
    /// # Panics
    ///
    /// If `capacity` is smaller than the current capacity.
    pub fn grow(&mut self, capacity: usize) -> Result<(), TableError> {
        assert!(
            capacity >= self.capacity,
            "a table cannot shrink: {} -> {capacity} slots",
            self.capacity
        );
        if capacity == 0 {
            return Ok(());
        }
        let new_capacity = capacity
            .checked_next_power_of_two()
            .ok_or(TableError::CapacityOverflow {
                requested: capacity,
            })?;
        let layout = Layout::array::<Entry<K, V>>(new_capacity).map_err(|_| {
            TableError::CapacityOverflow {
                requested: new_capacity,
            }
        })?;
        let block = self
            .allocator
            .allocate_zeroed(layout)
            .map_err(|_| TableError::AllocFailed {
                bytes: layout.size(),
            })?;
        let fresh = block.cast::<Entry<K, V>>();

        let mask = new_capacity - 1;
        for old in self.slots() {
            if !old.signature.is_occupied() {
                continue;
            }
            let mut index = old.signature.home_slot(new_capacity);
            let mut step = 1;
            // SAFETY: `index` is masked into the fresh array. The fresh array
            // holds more slots than live entries and triangular probing
            // visits all of them, so an empty slot is always found.
            unsafe {
                while !(*fresh.as_ptr().add(index)).signature.is_empty() {
                    index = (index + step) & mask;
                    step += 1;
                }
                ptr::copy_nonoverlapping(old, fresh.as_ptr().add(index), 1);
            }
        }

        let old_capacity = self.capacity;
        if old_capacity > 0 {
            // SAFETY: the old array came from this allocator and every live
            // entry was moved out bitwise above.
            unsafe { self.allocator.release(Some(self.entries.cast())) };
        }
        self.entries = fresh;
        self.capacity = new_capacity;
        tracing::debug!(
            old_capacity,
            new_capacity,
            live = self.count,
            "table grown"
        );
        Ok(())
    }

    /// Drop every entry, keeping the entry array.
    pub fn clear(&mut self) {
        self.drop_entries();
        if self.capacity > 0 {
            // SAFETY: the array holds `capacity` slots and an all-zero slot is
            // a valid empty slot.
            unsafe { ptr::write_bytes(self.entries.as_ptr(), 0, self.capacity) };
        }
    }

    fn slots(&self) -> &[Entry<K, V>] {
        // SAFETY: `entries` points at `capacity` initialized slots, or is
        // dangling with a capacity of zero.
        unsafe { slice::from_raw_parts(self.entries.as_ptr(), self.capacity) }
    }

    fn slots_mut(&mut self) -> &mut [Entry<K, V>] {
        // SAFETY: as in `slots`, and `&mut self` makes the access unique.
        unsafe { slice::from_raw_parts_mut(self.entries.as_ptr(), self.capacity) }
    }

    /// Probe for `key`. Returns its slot if present, otherwise the slot an
    /// insert should use: the first tombstone passed, or the empty slot that
    /// ended the probe. `None` when every slot was probed without finding
    /// either a match or an empty slot.
    fn find_slot<Q>(&self, key: &Q, signature: Signature) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        if self.capacity == 0 {
            return None;
        }
        let slots = self.slots();
        let mask = self.capacity - 1;
        let mut index = signature.home_slot(self.capacity);
        let mut first_tombstone = None;
        for step in 1..=self.capacity {
            let entry = &slots[index];
            if entry.signature.is_empty() {
                return Some(first_tombstone.unwrap_or(index));
            }
            if entry.signature.is_tombstone() {
                if first_tombstone.is_none() {
                    first_tombstone = Some(index);
                }
            } else if entry.signature == signature {
                // SAFETY: the slot is occupied.
                if unsafe { entry.pair().0 }.borrow() == key {
                    return Some(index);
                }
            }
            index = (index + step) & mask;
        }
        None
    }

    /// The occupied slot holding `key`.
    fn lookup<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
        H: KeyHasher<Q>,
    {
        if self.count == 0 {
            return None;
        }
        let signature = Signature::from_hash(self.hasher.hash_key(key));
        self.find_slot(key, signature)
            .filter(|&index| self.slots()[index].signature.is_occupied())
    }

    /// Resolve the slot for inserting `key`, growing first if the insert
    /// would reach the load factor.
    fn claim(&mut self, key: &K) -> Result<Slot, TableError>
    where
        K: Eq,
        H: KeyHasher<K>,
    {
        if (self.count + 1) * 100 >= self.capacity * LOAD_FACTOR_PERCENT {
            let target = if self.capacity >= MIN_CAPACITY {
                self.capacity
                    .checked_mul(2)
                    .ok_or(TableError::CapacityOverflow {
                        requested: usize::MAX,
                    })?
            } else {
                MIN_CAPACITY
            };
            self.grow(target)?;
        }

        let signature = Signature::from_hash(self.hasher.hash_key(key));
        let index = match self.find_slot(key, signature) {
            Some(index) => index,
            None => {
                // Tombstones filled every empty slot on the probe path.
                let capacity = self.capacity;
                tracing::debug!(capacity, live = self.count, "rebuilding saturated table");
                self.grow(capacity)?;
                self.find_slot(key, signature)
                    .ok_or(TableError::Saturated { capacity })?
            }
        };
        if self.slots()[index].signature.is_occupied() {
            Ok(Slot::Occupied(index))
        } else {
            Ok(Slot::Vacant(index, signature))
        }
    }

    fn occupy(&mut self, index: usize, signature: Signature, key: K, value: V) -> &mut V {
        self.count += 1;
        let entry = &mut self.slots_mut()[index];
        entry.key.write(key);
        entry.signature = signature;
        entry.value.write(value)
    }

    fn drop_entries(&mut self) {
        self.count = 0;
        if !mem::needs_drop::<K>() && !mem::needs_drop::<V>() {
            return;
        }
        for entry in self.slots_mut() {
            if entry.signature.is_occupied() {
                entry.signature = Signature::EMPTY;
                // SAFETY: the slot was occupied and is now marked empty, so
                // these are dropped exactly once.
                unsafe {
                    entry.key.assume_init_drop();
                    entry.value.assume_init_drop();
                }
            }
        }
    }
}

impl<K, V, H, A: Allocator> Drop for Table<K, V, H, A> {
    fn drop(&mut self) {
        self.drop_entries();
        if self.capacity > 0 {
            // SAFETY: the array came from this allocator and is not used again.
            unsafe { self.allocator.release(Some(self.entries.cast())) };
        }
    }
}

// SAFETY: the table owns its entries and its array; sending it sends them.
unsafe impl<K: Send, V: Send, H: Send, A: Allocator + Send> Send for Table<K, V, H, A> {}

// SAFETY: `&Table` only hands out shared references to entries.
unsafe impl<K: Sync, V: Sync, H: Sync, A: Allocator + Sync> Sync for Table<K, V, H, A> {}

impl<K, V, H: Default, A: Allocator + Default> Default for Table<K, V, H, A> {
    fn default() -> Self {
        Self::with_hasher_in(H::default(), A::default())
    }
}

impl<K: fmt::Debug, V: fmt::Debug, H, A: Allocator> fmt::Debug for Table<K, V, H, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a, K, V, H, A: Allocator> IntoIterator for &'a Table<K, V, H, A> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, H, A: Allocator> IntoIterator for &'a mut Table<K, V, H, A> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}
