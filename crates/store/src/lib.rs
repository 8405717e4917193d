//! Abstract key/value store for the nova host stack.
//!
//! All persistent game state lives in a namespaced key/value store with
//! redis-like value families: plain strings, hashes, lists, and sets.
//! The core treats the store as a collaborator; this crate defines the
//! interface plus the in-memory implementation that backs the test suite
//! and single-process deployments. Networked backends implement [`Store`]
//! outside this workspace.
//!
//! Values are byte strings. Scores and turn statuses are stored as packed
//! little-endian arrays, so the interface must not assume UTF-8.

mod memory;

pub use memory::*;

/// Byte-string value as stored under a key or hash field.
pub type Bytes = Vec<u8>;

/// Interface to the persistent store.
///
/// Lookups are total: a missing key reads as `None`, an empty list, or
/// zero, exactly like the backing database. Write operations create keys
/// on demand.
pub trait Store: Send + Sync {
    // Plain string keys.
    fn get(&self, key: &str) -> Option<Bytes>;
    fn set(&self, key: &str, value: &[u8]);
    fn del(&self, key: &str);
    fn exists(&self, key: &str) -> bool;
    /// Add to an integer key, returning the new value. Missing reads as 0.
    fn incr(&self, key: &str, by: i64) -> i64;

    // Hash keys.
    fn hget(&self, key: &str, field: &str) -> Option<Bytes>;
    fn hset(&self, key: &str, field: &str, value: &[u8]);
    fn hdel(&self, key: &str, field: &str);
    fn hincr(&self, key: &str, field: &str, by: i64) -> i64;
    fn hgetall(&self, key: &str) -> Vec<(String, Bytes)>;

    // List keys. Front is the head of the list.
    fn lpush(&self, key: &str, value: &[u8]);
    fn rpush(&self, key: &str, value: &[u8]);
    fn lpop(&self, key: &str) -> Option<Bytes>;
    fn rpop(&self, key: &str) -> Option<Bytes>;
    fn lrange(&self, key: &str) -> Vec<Bytes>;
    fn llen(&self, key: &str) -> usize;

    // Set keys.
    fn sadd(&self, key: &str, member: &str);
    fn srem(&self, key: &str, member: &str);
    fn sismember(&self, key: &str, member: &str) -> bool;
    fn smembers(&self, key: &str) -> Vec<String>;
}

/// Typed read helpers over the byte-string interface.
pub trait StoreExt: Store {
    fn get_int(&self, key: &str) -> i64 {
        self.get(key).as_deref().map(parse_int).unwrap_or(0)
    }
    fn get_str(&self, key: &str) -> String {
        self.get(key).map(into_string).unwrap_or_default()
    }
    fn set_int(&self, key: &str, value: i64) {
        self.set(key, value.to_string().as_bytes());
    }
    fn hget_int(&self, key: &str, field: &str) -> i64 {
        self.hget(key, field).as_deref().map(parse_int).unwrap_or(0)
    }
    fn hget_int_opt(&self, key: &str, field: &str) -> Option<i64> {
        self.hget(key, field).as_deref().map(parse_int)
    }
    fn hget_str(&self, key: &str, field: &str) -> String {
        self.hget(key, field).map(into_string).unwrap_or_default()
    }
    fn hset_int(&self, key: &str, field: &str, value: i64) {
        self.hset(key, field, value.to_string().as_bytes());
    }
    fn hset_str(&self, key: &str, field: &str, value: &str) {
        self.hset(key, field, value.as_bytes());
    }
    fn lrange_str(&self, key: &str) -> Vec<String> {
        self.lrange(key).into_iter().map(into_string).collect()
    }
}

impl<S: Store + ?Sized> StoreExt for S {}

fn parse_int(bytes: &[u8]) -> i64 {
    std::str::from_utf8(bytes)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(0)
}

fn into_string(bytes: Bytes) -> String {
    String::from_utf8_lossy(&bytes).into_owned()
}
