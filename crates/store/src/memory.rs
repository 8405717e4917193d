use crate::Bytes;
use crate::Store;
use std::collections::BTreeSet;
use std::collections::HashMap;
use std::collections::VecDeque;
use std::sync::RwLock;

/// One keyed value. A key holds exactly one family at a time, like the
/// backing database.
#[derive(Debug, Clone)]
enum Entry {
    Str(Bytes),
    Hash(HashMap<String, Bytes>),
    List(VecDeque<Bytes>),
    Set(BTreeSet<String>),
}

/// In-memory [`Store`] used by tests and single-process deployments.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RwLock<HashMap<String, Entry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn get(&self, key: &str) -> Option<Bytes> {
        match self.data.read().unwrap().get(key) {
            Some(Entry::Str(v)) => Some(v.clone()),
            _ => None,
        }
    }
    fn set(&self, key: &str, value: &[u8]) {
        self.data
            .write()
            .unwrap()
            .insert(key.to_string(), Entry::Str(value.to_vec()));
    }
    fn del(&self, key: &str) {
        self.data.write().unwrap().remove(key);
    }
    fn exists(&self, key: &str) -> bool {
        self.data.read().unwrap().contains_key(key)
    }
    fn incr(&self, key: &str, by: i64) -> i64 {
        let mut data = self.data.write().unwrap();
        let value = match data.get(key) {
            Some(Entry::Str(v)) => crate::parse_int(v) + by,
            _ => by,
        };
        data.insert(key.to_string(), Entry::Str(value.to_string().into_bytes()));
        value
    }

    fn hget(&self, key: &str, field: &str) -> Option<Bytes> {
        match self.data.read().unwrap().get(key) {
            Some(Entry::Hash(h)) => h.get(field).cloned(),
            _ => None,
        }
    }
    fn hset(&self, key: &str, field: &str, value: &[u8]) {
        let mut data = self.data.write().unwrap();
        match data
            .entry(key.to_string())
            .or_insert_with(|| Entry::Hash(HashMap::new()))
        {
            Entry::Hash(h) => {
                h.insert(field.to_string(), value.to_vec());
            }
            other => *other = Entry::Hash(HashMap::from([(field.to_string(), value.to_vec())])),
        }
    }
    fn hdel(&self, key: &str, field: &str) {
        let mut data = self.data.write().unwrap();
        if let Some(Entry::Hash(h)) = data.get_mut(key) {
            h.remove(field);
            if h.is_empty() {
                data.remove(key);
            }
        }
    }
    fn hincr(&self, key: &str, field: &str, by: i64) -> i64 {
        let mut data = self.data.write().unwrap();
        let entry = data
            .entry(key.to_string())
            .or_insert_with(|| Entry::Hash(HashMap::new()));
        match entry {
            Entry::Hash(h) => {
                let value = h.get(field).map(|v| crate::parse_int(v)).unwrap_or(0) + by;
                h.insert(field.to_string(), value.to_string().into_bytes());
                value
            }
            _ => {
                *entry = Entry::Hash(HashMap::from([(
                    field.to_string(),
                    by.to_string().into_bytes(),
                )]));
                by
            }
        }
    }
    fn hgetall(&self, key: &str) -> Vec<(String, Bytes)> {
        match self.data.read().unwrap().get(key) {
            Some(Entry::Hash(h)) => {
                let mut all = h
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect::<Vec<_>>();
                all.sort();
                all
            }
            _ => Vec::new(),
        }
    }

    fn lpush(&self, key: &str, value: &[u8]) {
        let mut data = self.data.write().unwrap();
        match data
            .entry(key.to_string())
            .or_insert_with(|| Entry::List(VecDeque::new()))
        {
            Entry::List(l) => l.push_front(value.to_vec()),
            other => *other = Entry::List(VecDeque::from([value.to_vec()])),
        }
    }
    fn rpush(&self, key: &str, value: &[u8]) {
        let mut data = self.data.write().unwrap();
        match data
            .entry(key.to_string())
            .or_insert_with(|| Entry::List(VecDeque::new()))
        {
            Entry::List(l) => l.push_back(value.to_vec()),
            other => *other = Entry::List(VecDeque::from([value.to_vec()])),
        }
    }
    fn lpop(&self, key: &str) -> Option<Bytes> {
        let mut data = self.data.write().unwrap();
        match data.get_mut(key) {
            Some(Entry::List(l)) => l.pop_front(),
            _ => None,
        }
    }
    fn rpop(&self, key: &str) -> Option<Bytes> {
        let mut data = self.data.write().unwrap();
        match data.get_mut(key) {
            Some(Entry::List(l)) => l.pop_back(),
            _ => None,
        }
    }
    fn lrange(&self, key: &str) -> Vec<Bytes> {
        match self.data.read().unwrap().get(key) {
            Some(Entry::List(l)) => l.iter().cloned().collect(),
            _ => Vec::new(),
        }
    }
    fn llen(&self, key: &str) -> usize {
        match self.data.read().unwrap().get(key) {
            Some(Entry::List(l)) => l.len(),
            _ => 0,
        }
    }

    fn sadd(&self, key: &str, member: &str) {
        let mut data = self.data.write().unwrap();
        match data
            .entry(key.to_string())
            .or_insert_with(|| Entry::Set(BTreeSet::new()))
        {
            Entry::Set(s) => {
                s.insert(member.to_string());
            }
            other => *other = Entry::Set(BTreeSet::from([member.to_string()])),
        }
    }
    fn srem(&self, key: &str, member: &str) {
        let mut data = self.data.write().unwrap();
        if let Some(Entry::Set(s)) = data.get_mut(key) {
            s.remove(member);
        }
    }
    fn sismember(&self, key: &str, member: &str) -> bool {
        match self.data.read().unwrap().get(key) {
            Some(Entry::Set(s)) => s.contains(member),
            _ => false,
        }
    }
    fn smembers(&self, key: &str) -> Vec<String> {
        match self.data.read().unwrap().get(key) {
            Some(Entry::Set(s)) => s.iter().cloned().collect(),
            _ => Vec::new(),
        }
    }
}
