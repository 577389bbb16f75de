//! Caption windowing
//!
//! Maps synthesis progress offsets to words and shows the six-word line
//! that contains the current word.

/// Words shown per caption line
pub const CAPTION_WINDOW: usize = 6;

/// Words of one reply with their byte offsets
#[derive(Debug, Clone)]
pub struct CaptionTrack {
    words: Vec<String>,
    starts: Vec<usize>,
}

impl CaptionTrack {
    pub fn new(text: &str) -> Self {
        let mut words = Vec::new();
        let mut starts = Vec::new();
        let mut word_start = None;

        for (offset, ch) in text.char_indices() {
            match (ch.is_whitespace(), word_start) {
                (false, None) => word_start = Some(offset),
                (true, Some(start)) => {
                    starts.push(start);
                    words.push(text[start..offset].to_string());
                    word_start = None;
                }
                _ => {}
            }
        }
        if let Some(start) = word_start {
            starts.push(start);
            words.push(text[start..].to_string());
        }

        Self { words, starts }
    }

    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    /// Index of the last word starting at or before `offset`
    pub fn word_index_at(&self, offset: usize) -> usize {
        self.starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1)
    }

    /// The caption line containing word `index`
    pub fn window(&self, index: usize) -> String {
        let start = (index / CAPTION_WINDOW) * CAPTION_WINDOW;
        let end = (start + CAPTION_WINDOW).min(self.words.len());
        if start >= end {
            return String::new();
        }
        self.words[start..end].join(" ")
    }

    /// Caption line for a progress offset
    pub fn line_at(&self, offset: usize) -> String {
        self.window(self.word_index_at(offset))
    }

    /// Byte offset where each word begins
    pub fn word_starts(&self) -> &[usize] {
        &self.starts
    }
}
