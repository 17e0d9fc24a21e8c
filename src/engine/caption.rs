//! Caption display
//!
//! Caption markers in the gesture queue replace the displayed text when
//! playback reaches them. The last caption stays up after the queue drains.

use std::collections::VecDeque;

/// Captions kept for the transcript; older ones are dropped
pub const MAX_CAPTION_CHUNKS: usize = 256;

/// Receiver of caption changes
pub trait CaptionSink: Send {
    /// Replace the displayed caption
    fn show(&mut self, text: &str);

    /// Remove any displayed caption
    fn clear(&mut self);
}

/// A caption shown during playback
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionChunk {
    /// Engine tick on which the caption appeared
    pub tick: u64,
    pub text: String,
}

impl CaptionChunk {
    pub fn new(tick: u64, text: &str) -> Self {
        Self {
            tick,
            text: text.to_string(),
        }
    }
}

/// Caption state kept by the engine
#[derive(Debug)]
pub struct CaptionTracker {
    /// Most recent captions since the last clear, in order
    chunks: VecDeque<CaptionChunk>,
    enabled: bool,
}

impl Default for CaptionTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptionTracker {
    pub fn new() -> Self {
        Self {
            chunks: VecDeque::new(),
            enabled: true,
        }
    }

    /// Record a caption; returns false when captions are disabled
    pub fn show_at(&mut self, tick: u64, text: &str) -> bool {
        if !self.enabled {
            return false;
        }
        if self.chunks.len() == MAX_CAPTION_CHUNKS {
            self.chunks.pop_front();
        }
        self.chunks.push_back(CaptionChunk::new(tick, text));
        true
    }

    /// Caption currently displayed
    pub fn current(&self) -> Option<&str> {
        if !self.enabled {
            return None;
        }
        self.chunks.back().map(|c| c.text.as_str())
    }

    /// Concatenated recent captions since the last clear
    pub fn transcript(&self) -> String {
        self.chunks.iter().map(|c| c.text.as_str()).collect()
    }

    pub fn chunks(&self) -> impl Iterator<Item = &CaptionChunk> {
        self.chunks.iter()
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn clear(&mut self) {
        self.chunks.clear();
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl CaptionSink for CaptionTracker {
    /// Stamped with the tick of the previous caption
    fn show(&mut self, text: &str) {
        let tick = self.chunks.back().map_or(0, |c| c.tick);
        self.show_at(tick, text);
    }

    fn clear(&mut self) {
        CaptionTracker::clear(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracker_new() {
        let tracker = CaptionTracker::new();
        assert!(tracker.chunks.is_empty());
        assert!(tracker.is_enabled());
        assert_eq!(tracker.current(), None);
    }

    #[test]
    fn test_tracker_shows_latest() {
        let mut tracker = CaptionTracker::new();
        assert!(tracker.show_at(1, "H"));
        assert!(tracker.show_at(9, "I "));
        assert_eq!(tracker.current(), Some("I "));
        assert_eq!(tracker.transcript(), "HI ");
        assert_eq!(tracker.chunks().nth(1), Some(&CaptionChunk::new(9, "I ")));
    }

    #[test]
    fn test_tracker_clear() {
        let mut tracker = CaptionTracker::new();
        tracker.show_at(1, "Test");
        tracker.clear();
        assert_eq!(tracker.chunk_count(), 0);
        assert_eq!(tracker.current(), None);
    }

    #[test]
    fn test_tracker_disabled() {
        let mut tracker = CaptionTracker::new();
        tracker.set_enabled(false);
        assert!(!tracker.show_at(3, "Text"));
        assert!(tracker.current().is_none());
        assert_eq!(tracker.chunk_count(), 0);
    }

    #[test]
    fn test_tracker_as_sink() {
        let mut tracker = CaptionTracker::new();
        tracker.show_at(4, "A");
        let sink: &mut dyn CaptionSink = &mut tracker;
        sink.show("B");
        assert_eq!(tracker.chunks().nth(1).map(|c| c.tick), Some(4));
        let sink: &mut dyn CaptionSink = &mut tracker;
        sink.clear();
        assert_eq!(tracker.transcript(), "");
    }

    #[test]
    fn test_tracker_keeps_recent_chunks() {
        let mut tracker = CaptionTracker::new();
        for tick in 0..(MAX_CAPTION_CHUNKS as u64 + 10) {
            tracker.show_at(tick, "A");
        }
        tracker.show_at(1000, "Z ");
        assert_eq!(tracker.chunk_count(), MAX_CAPTION_CHUNKS);
        assert_eq!(tracker.chunks().next().map(|c| c.tick), Some(11));
        assert_eq!(tracker.current(), Some("Z "));
        assert!(tracker.transcript().ends_with("AZ "));
    }
}
