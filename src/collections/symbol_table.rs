//! Separate-chaining hash map from owned names to small values.
//!
//! Keys are owned by the table. [`SymbolTable::set`] and [`SymbolTable::merge`]
//! take keys by value; a key that turns out to be a duplicate is dropped on the
//! spot, so there is never more than one live copy of a name per table.
use core::fmt;

const INITIAL_CAPACITY: usize = 8;

type Chain<V> = Option<Box<Entry<V>>>;

#[derive(Clone)]
struct Entry<V> {
    key: Box<str>,
    value: V,
    next: Chain<V>,
}

/// Polynomial rolling hash (`h * 31 + byte`) reduced to a bucket index.
fn bucket_index(key: &str, capacity: usize) -> usize {
    key.bytes()
        .fold(0usize, |h, b| h.wrapping_mul(31).wrapping_add(usize::from(b)))
        % capacity
}

fn empty_buckets<V>(capacity: usize) -> Box<[Chain<V>]> {
    std::iter::repeat_with(|| None).take(capacity).collect()
}

#[derive(Clone)]
pub struct SymbolTable<V> {
    buckets: Box<[Chain<V>]>,
    len: usize,
}

impl<V> Default for SymbolTable<V> {
    fn default() -> Self {
        Self {
            buckets: empty_buckets(INITIAL_CAPACITY),
            len: 0,
        }
    }
}

impl<V: Copy> SymbolTable<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of buckets.
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    pub fn load_factor(&self) -> f64 {
        self.len as f64 / self.capacity() as f64
    }

    /// Doubles the bucket array, relinking the existing entries into it.
    fn rehash(&mut self) {
        let capacity = self.capacity() * 2;
        let mut buckets = empty_buckets(capacity);
        for bucket in self.buckets.iter_mut() {
            let mut chain = bucket.take();
            while let Some(mut entry) = chain {
                chain = entry.next.take();
                let index = bucket_index(&entry.key, capacity);
                entry.next = buckets[index].take();
                buckets[index] = Some(entry);
            }
        }
        self.buckets = buckets;
    }

    /// Binds `key` to `value`. Returns `true` if the key was already present; its
    /// value is then overwritten and the passed-in key dropped.
    pub fn set(&mut self, key: Box<str>, value: V) -> bool {
        if self.len >= self.capacity() {
            self.rehash();
        }

        let index = bucket_index(&key, self.capacity());
        let mut entry = self.buckets[index].as_deref_mut();
        while let Some(existing) = entry {
            if existing.key == key {
                existing.value = value;
                return true;
            }
            entry = existing.next.as_deref_mut();
        }

        let next = self.buckets[index].take();
        self.buckets[index] = Some(Box::new(Entry { key, value, next }));
        self.len += 1;
        false
    }

    pub fn get(&self, key: &str) -> Option<V> {
        let index = bucket_index(key, self.capacity());
        let mut entry = self.buckets[index].as_deref();
        while let Some(existing) = entry {
            if &*existing.key == key {
                return Some(existing.value);
            }
            entry = existing.next.as_deref();
        }
        None
    }

    /// Moves every entry of `other` into `self`. Keys already present in `self`
    /// keep `self`'s copy of the name and take `other`'s value.
    pub fn merge(&mut self, mut other: SymbolTable<V>) {
        for bucket in other.buckets.iter_mut() {
            let mut chain = bucket.take();
            while let Some(mut entry) = chain {
                chain = entry.next.take();
                let Entry { key, value, .. } = *entry;
                self.set(key, value);
            }
        }
    }

    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            buckets: self.buckets.iter(),
            entry: None,
        }
    }
}

impl<V: Copy + fmt::Debug> fmt::Debug for SymbolTable<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Iterates entries in bucket order.
pub struct Iter<'a, V> {
    buckets: std::slice::Iter<'a, Chain<V>>,
    entry: Option<&'a Entry<V>>,
}

impl<'a, V: Copy> Iterator for Iter<'a, V> {
    type Item = (&'a str, V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(entry) = self.entry {
                self.entry = entry.next.as_deref();
                return Some((&*entry.key, entry.value));
            }
            self.entry = self.buckets.next()?.as_deref();
        }
    }
}
