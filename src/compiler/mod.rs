//! Utterance compiler
//!
//! Turns free text into a gesture queue. Each word resolves to a custom
//! sign, then a built-in library word, and otherwise is spelled letter by
//! letter. Caption markers precede the motion they describe.

use std::collections::HashMap;
use std::sync::Arc;

use crossbeam::channel::Receiver;

use crate::gesture::{GestureDefinition, GestureLibrary, GestureQueue};
use crate::signs::{resolve_all, SignEvent, SignStore, SignStoreResult};

/// Split text into upper-cased words, dropping periods
pub fn tokenize(text: &str) -> Vec<String> {
    text.replace('.', "")
        .to_uppercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Connection to a sign store and its change feed
struct StoreLink {
    store: Arc<dyn SignStore>,
    events: Receiver<SignEvent>,
}

pub struct UtteranceCompiler {
    library: Arc<GestureLibrary>,
    custom: HashMap<String, GestureDefinition>,
    link: Option<StoreLink>,
}

impl UtteranceCompiler {
    pub fn new(library: Arc<GestureLibrary>) -> Self {
        Self {
            library,
            custom: HashMap::new(),
            link: None,
        }
    }

    pub fn library(&self) -> &GestureLibrary {
        &self.library
    }

    /// Replace the custom-sign map; keys are upper-cased
    pub fn set_custom_signs(&mut self, signs: HashMap<String, GestureDefinition>) {
        self.custom = signs
            .into_iter()
            .map(|(name, gesture)| (name.trim().to_uppercase(), gesture))
            .collect();
    }

    pub fn custom_signs(&self) -> impl Iterator<Item = &str> {
        self.custom.keys().map(String::as_str)
    }

    /// Load custom signs from `store` and follow its changes
    pub fn attach_store(&mut self, store: Arc<dyn SignStore>) -> SignStoreResult<()> {
        let events = store.subscribe();
        self.custom = resolve_all(&store.list()?);
        log::info!("Loaded {} custom signs", self.custom.len());
        self.link = Some(StoreLink { store, events });
        Ok(())
    }

    /// Re-resolve custom signs if the store changed since the last call
    ///
    /// Returns whether the map was rebuilt. A failing store keeps the
    /// previous map.
    pub fn refresh(&mut self) -> bool {
        let Some(link) = &self.link else {
            return false;
        };
        // Events stay queued until a listing succeeds so a failure retries
        let changes = link.events.len();
        if changes == 0 {
            return false;
        }
        match link.store.list() {
            Ok(records) => {
                link.events.try_iter().take(changes).for_each(drop);
                self.custom = resolve_all(&records);
                log::debug!(
                    "Custom signs refreshed after {} changes ({} signs)",
                    changes,
                    self.custom.len()
                );
                true
            }
            Err(e) => {
                log::error!("Failed to refresh custom signs: {}", e);
                false
            }
        }
    }

    /// Gesture for a whole word, custom signs first
    pub fn resolve_word(&self, word: &str) -> Option<&GestureDefinition> {
        let key = word.trim().to_uppercase();
        self.custom.get(&key).or_else(|| self.library.lookup(&key))
    }

    /// Compile an utterance into a gesture queue
    pub fn compile(&mut self, text: &str) -> GestureQueue {
        self.refresh();
        let mut queue = GestureQueue::new();
        for word in tokenize(text) {
            match self.resolve_word(&word) {
                Some(gesture) => {
                    queue.push_caption(format!("{} ", word));
                    queue.push_gesture(gesture);
                }
                None => {
                    log::debug!("No sign for {}, spelling it", word);
                    self.spell(&word, &mut queue);
                }
            }
        }
        queue
    }

    fn spell(&self, word: &str, queue: &mut GestureQueue) {
        let count = word.chars().count();
        for (i, ch) in word.chars().enumerate() {
            if i + 1 == count {
                queue.push_caption(format!("{} ", ch));
            } else {
                queue.push_caption(ch.to_string());
            }
            match self.library.letter(ch) {
                Some(gesture) => queue.push_gesture(gesture),
                None => log::warn!("No gesture for letter {}", ch),
            }
        }
    }

    /// Queue for exactly one named sign
    pub fn compile_sign(&mut self, name: &str) -> Option<GestureQueue> {
        self.refresh();
        let name = name.trim().to_uppercase();
        let gesture = self.resolve_word(&name)?;
        let mut queue = GestureQueue::new();
        queue.push_caption(name.clone());
        queue.push_gesture(gesture);
        Some(queue)
    }

    /// Queue for one fingerspelled letter
    pub fn compile_letter(&self, letter: char) -> Option<GestureQueue> {
        let letter = letter.to_ascii_uppercase();
        let gesture = self.library.letter(letter)?;
        let mut queue = GestureQueue::new();
        queue.push_caption(letter.to_string());
        queue.push_gesture(gesture);
        Some(queue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::{placeholder_gesture, QueueEntry};
    use crate::signs::{MemorySignStore, SignRecord, SignStoreError};
    use parking_lot::Mutex;

    fn compiler() -> UtteranceCompiler {
        UtteranceCompiler::new(Arc::new(GestureLibrary::builtin()))
    }

    #[test]
    fn test_tokenize() {
        assert_eq!(tokenize("  hello.  world. "), vec!["HELLO", "WORLD"]);
        assert!(tokenize("...").is_empty());
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn test_known_word_gets_one_marker() {
        let mut c = compiler();
        let queue = c.compile("hello");
        let hello = c.library().lookup("HELLO").unwrap().clone();
        assert_eq!(queue.captions(), vec!["HELLO "]);
        assert_eq!(queue.group_count(), hello.group_count());
        assert_eq!(queue.front(), Some(&QueueEntry::Caption("HELLO ".into())));
    }

    #[test]
    fn test_unknown_word_is_spelled() {
        let mut c = compiler();
        let queue = c.compile("cab");
        assert_eq!(queue.captions(), vec!["C", "A", "B "]);
        let letters: usize = ['C', 'A', 'B']
            .iter()
            .map(|ch| c.library().letter(*ch).unwrap().group_count())
            .sum();
        assert_eq!(queue.group_count(), letters);
    }

    #[test]
    fn test_letter_without_gesture_keeps_marker() {
        let mut c = compiler();
        let queue = c.compile("A1");
        assert_eq!(queue.captions(), vec!["A", "1 "]);
        assert_eq!(
            queue.group_count(),
            c.library().letter('A').unwrap().group_count()
        );
        // the "1 " marker is the last entry
        assert!(queue.iter().last().unwrap().is_caption());
    }

    #[test]
    fn test_custom_sign_shadows_builtin() {
        let mut c = compiler();
        let mut custom = HashMap::new();
        custom.insert("hello".to_string(), placeholder_gesture("HELLO"));
        c.set_custom_signs(custom);
        let queue = c.compile("hello");
        assert_eq!(queue.group_count(), 2);
    }

    #[test]
    fn test_store_changes_are_picked_up() {
        let store = Arc::new(MemorySignStore::new());
        let mut c = compiler();
        c.attach_store(store.clone()).unwrap();
        assert_eq!(c.compile("zz").captions(), vec!["Z", "Z "]);

        store.create(SignRecord::new("zz").with_id("1")).unwrap();
        assert_eq!(c.compile("zz").captions(), vec!["ZZ "]);
        assert!(!c.refresh());

        store.delete("1").unwrap();
        assert!(c.refresh());
        assert!(c.resolve_word("ZZ").is_none());
    }

    /// Store whose listing can be switched off
    struct FlakyStore {
        inner: MemorySignStore,
        failing: Mutex<bool>,
    }

    impl SignStore for FlakyStore {
        fn list(&self) -> SignStoreResult<Vec<SignRecord>> {
            if *self.failing.lock() {
                return Err(SignStoreError::Io(std::io::Error::other("disk gone")));
            }
            self.inner.list()
        }
        fn get_by_name(&self, name: &str) -> SignStoreResult<Option<SignRecord>> {
            self.inner.get_by_name(name)
        }
        fn create(&self, record: SignRecord) -> SignStoreResult<SignRecord> {
            self.inner.create(record)
        }
        fn delete(&self, id: &str) -> SignStoreResult<SignRecord> {
            self.inner.delete(id)
        }
        fn subscribe(&self) -> Receiver<SignEvent> {
            self.inner.subscribe()
        }
    }

    #[test]
    fn test_failed_refresh_retries_later() {
        let store = Arc::new(FlakyStore {
            inner: MemorySignStore::new(),
            failing: Mutex::new(false),
        });
        let mut c = compiler();
        c.attach_store(store.clone()).unwrap();

        *store.failing.lock() = true;
        store.create(SignRecord::new("zz").with_id("1")).unwrap();
        assert!(!c.refresh());
        assert_eq!(c.compile("zz").captions(), vec!["Z", "Z "]);

        *store.failing.lock() = false;
        assert!(c.refresh());
        assert_eq!(c.compile("zz").captions(), vec!["ZZ "]);
        assert!(!c.refresh());
    }

    #[test]
    fn test_compile_sign_and_letter() {
        let mut c = compiler();
        let sign = c.compile_sign("time").unwrap();
        assert_eq!(sign.captions(), vec!["TIME"]);
        assert!(c.compile_sign("nothing").is_none());

        let letter = c.compile_letter('b').unwrap();
        assert_eq!(letter.captions(), vec!["B"]);
        assert!(c.compile_letter('?').is_none());
    }
}
