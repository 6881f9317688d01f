use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{debug, warn};

/// A string map mirrored to a tab-separated file after every change.
#[derive(Debug)]
pub struct KeyValueStore {
    entries: HashMap<String, String>,
    path: PathBuf,
}

impl KeyValueStore {
    /// Opens the store at `path`, loading whatever it already holds.
    ///
    /// A missing or unreadable file gives an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(contents) => parse(&contents),
            Err(e) => {
                debug!("starting with an empty store, could not read {:?}: {}", path, e);
                HashMap::new()
            }
        };
        Self { entries, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Adds `key` unless it is already present. Existing values are kept.
    pub fn set(&mut self, key: &str, value: &str) -> String {
        self.entries
            .entry(key.to_string())
            .or_insert_with(|| value.to_string());
        self.persist();
        format!("Added {} and value {}\n", key, value)
    }

    pub fn get(&self, key: &str) -> String {
        match self.entries.get(key) {
            Some(value) => value.clone(),
            None => format!("Key: {} not found.", key),
        }
    }

    pub fn remove(&mut self, key: &str) -> String {
        self.entries.remove(key);
        self.persist();
        "Removed key".to_string()
    }

    /// Lists every entry, sorted by key.
    pub fn print(&self) -> String {
        self.sorted()
            .map(|(key, value)| format!("[KEY]: {}\t[VALUE]: {}\n", key, value))
            .collect()
    }

    fn sorted(&self) -> impl Iterator<Item = (&String, &String)> {
        self.entries.iter().collect::<BTreeMap<_, _>>().into_iter()
    }

    fn persist(&self) {
        if let Err(e) = self.save() {
            warn!("failed to save store to {:?}: {}", self.path, e);
        }
    }

    fn save(&self) -> io::Result<()> {
        let mut file = BufWriter::new(File::create(&self.path)?);
        for (key, value) in self.sorted() {
            writeln!(file, "{}\t{}", key, value)?;
        }
        file.flush()
    }
}

/// A line without a tab is taken as both key and value.
fn parse(contents: &str) -> HashMap<String, String> {
    contents
        .lines()
        .map(|line| match line.split_once('\t') {
            Some((key, value)) => (key.to_string(), value.to_string()),
            None => (line.to_string(), line.to_string()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    fn temp_store(name: &str) -> PathBuf {
        let path = env::temp_dir().join(format!("line-client-{}-{}.txt", name, std::process::id()));
        let _ = fs::remove_file(&path);
        path
    }

    #[test]
    fn test_set_get_remove() {
        let path = temp_store("set-get-remove");
        let mut store = KeyValueStore::open(&path);
        assert!(store.is_empty());

        assert_eq!(store.set("fruit", "apple"), "Added fruit and value apple\n");
        assert_eq!(store.get("fruit"), "apple");
        assert_eq!(store.remove("fruit"), "Removed key");
        assert_eq!(store.get("fruit"), "Key: fruit not found.");
        // Removing a missing key is not an error.
        assert_eq!(store.remove("fruit"), "Removed key");

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_set_keeps_existing_value() {
        let path = temp_store("keeps-existing");
        let mut store = KeyValueStore::open(&path);
        store.set("k", "first");
        assert_eq!(store.set("k", "second"), "Added k and value second\n");
        assert_eq!(store.get("k"), "first");
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_persists_across_open() {
        let path = temp_store("persists");
        {
            let mut store = KeyValueStore::open(&path);
            store.set("b", "2");
            store.set("a", "1");
        }
        assert_eq!(fs::read_to_string(&path).unwrap(), "a\t1\nb\t2\n");

        let store = KeyValueStore::open(&path);
        assert_eq!(store.len(), 2);
        assert_eq!(store.print(), "[KEY]: a\t[VALUE]: 1\n[KEY]: b\t[VALUE]: 2\n");
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_parse_line_without_tab() {
        let entries = parse("lonely\nkey\tvalue with spaces\n");
        assert_eq!(entries["lonely"], "lonely");
        assert_eq!(entries["key"], "value with spaces");
    }
}
