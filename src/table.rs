use std::collections::TryReserveError;

/// Number of buckets used when none is configured.
pub const DEFAULT_BUCKETS: usize = 1024;

/// Bucket index for `key`: the sum of its byte values modulo the bucket count.
///
/// The hash is weak on purpose. Keys that are anagrams of each other always collide, and the
/// bucket order it produces is the order in which `GETALL` enumerates entries.
pub fn hash(key: &str, buckets: usize) -> usize {
    let sum = key
        .bytes()
        .fold(0u32, |sum, byte| sum.wrapping_add(u32::from(byte)));
    sum as usize % buckets
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub key: String,
    pub value: String,
}

/// A hash table with a fixed number of buckets, resolving collisions by chaining.
///
/// The table never grows or rehashes: lookups cost O(chain length), and chains grow without
/// bound as keys are added.
#[derive(Debug)]
pub struct HashTable {
    buckets: Vec<Vec<Entry>>,
    len: usize,
}

impl HashTable {
    pub fn new(buckets: usize) -> HashTable {
        let buckets = buckets.max(1);
        HashTable {
            buckets: (0..buckets).map(|_| Vec::new()).collect(),
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Inserts or replaces the binding for `key`.
    ///
    /// Returns `false` when memory for the key or value could not be obtained, in which case the
    /// table is left exactly as it was.
    pub fn set(&mut self, key: &str, value: &str) -> bool {
        let index = hash(key, self.buckets.len());
        let chain = &mut self.buckets[index];

        if let Some(entry) = chain.iter_mut().find(|entry| entry.key == key) {
            return match try_copy(value) {
                Ok(value) => {
                    entry.value = value;
                    true
                }
                Err(_) => false,
            };
        }

        let entry = match (try_copy(key), try_copy(value)) {
            (Ok(key), Ok(value)) => Entry { key, value },
            _ => return false,
        };
        if chain.try_reserve(1).is_err() {
            return false;
        }

        chain.push(entry);
        self.len += 1;
        true
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        if self.is_empty() {
            return None;
        }

        self.buckets[hash(key, self.buckets.len())]
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| entry.value.as_str())
    }

    /// Removes the binding for `key`, returning whether one existed.
    pub fn remove(&mut self, key: &str) -> bool {
        let index = hash(key, self.buckets.len());
        let chain = &mut self.buckets[index];

        match chain.iter().position(|entry| entry.key == key) {
            Some(position) => {
                chain.remove(position);
                self.len -= 1;
                true
            }
            None => false,
        }
    }

    /// Iterates over every entry in bucket order. Within a bucket the most recently inserted key
    /// comes first.
    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.buckets.iter().flat_map(|chain| chain.iter().rev())
    }
}

impl Default for HashTable {
    fn default() -> Self {
        Self::new(DEFAULT_BUCKETS)
    }
}

/// Copies `s` into a freshly allocated string, reporting allocation failure instead of aborting.
pub(crate) fn try_copy(s: &str) -> Result<String, TryReserveError> {
    let mut copy = String::new();
    copy.try_reserve_exact(s.len())?;
    copy.push_str(s);
    Ok(copy)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_sums_bytes() {
        assert_eq!(hash("", 1024), 0);
        assert_eq!(hash("a", 1024), 97);
        assert_eq!(hash("ab", 1024), 97 + 98);
        assert_eq!(hash("ab", 100), (97 + 98) % 100);
        assert_eq!(hash("ab", 1), 0);
    }

    #[test]
    fn anagrams_share_a_bucket() {
        assert_eq!(hash("listen", 1024), hash("silent", 1024));

        let mut table = HashTable::default();
        assert!(table.set("listen", "1"));
        assert!(table.set("silent", "2"));

        assert_eq!(table.len(), 2);
        assert_eq!(table.get("listen"), Some("1"));
        assert_eq!(table.get("silent"), Some("2"));
    }

    #[test]
    fn set_replaces_existing_value() {
        let mut table = HashTable::default();
        assert!(table.set("key", "v1"));
        assert!(table.set("key", "v2"));

        assert_eq!(table.len(), 1);
        assert_eq!(table.get("key"), Some("v2"));
    }

    #[test]
    fn get_missing_key() {
        let mut table = HashTable::default();
        assert_eq!(table.get("missing"), None);

        table.set("present", "1");
        assert_eq!(table.get("missing"), None);
    }

    #[test]
    fn remove_from_the_middle_of_a_chain() {
        // A single bucket forces every key onto one chain.
        let mut table = HashTable::new(1);
        table.set("a", "1");
        table.set("b", "2");
        table.set("c", "3");

        assert!(table.remove("b"));
        assert!(!table.remove("b"));

        assert_eq!(table.len(), 2);
        assert_eq!(table.get("a"), Some("1"));
        assert_eq!(table.get("b"), None);
        assert_eq!(table.get("c"), Some("3"));
    }

    #[test]
    fn iter_follows_bucket_order() {
        let mut table = HashTable::new(4);
        // "d" = 100 -> bucket 0, "a" = 97 -> bucket 1, "b" = 98 -> bucket 2.
        table.set("b", "2");
        table.set("a", "1");
        table.set("d", "4");

        let keys: Vec<&str> = table.iter().map(|entry| entry.key.as_str()).collect();
        assert_eq!(keys, vec!["d", "a", "b"]);
    }

    #[test]
    fn iter_lists_newest_first_within_a_bucket() {
        let mut table = HashTable::new(1);
        table.set("a", "1");
        table.set("b", "2");
        table.set("c", "3");
        // Replacing a value does not move the key.
        table.set("a", "4");

        let keys: Vec<&str> = table.iter().map(|entry| entry.key.as_str()).collect();
        assert_eq!(keys, vec!["c", "b", "a"]);

        table.remove("b");
        let keys: Vec<&str> = table.iter().map(|entry| entry.key.as_str()).collect();
        assert_eq!(keys, vec!["c", "a"]);
    }

    #[test]
    fn zero_buckets_is_clamped() {
        let mut table = HashTable::new(0);
        assert!(table.set("k", "v"));
        assert_eq!(table.get("k"), Some("v"));
    }
}
