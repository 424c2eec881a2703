/// Incremental transliteration matcher.
///
/// Holds one `CharState` per syllable of the target string and a cursor.
/// Each key either extends the current syllable's buffer (`Correct`),
/// finishes the whole string (`Complete`), or is discarded (`Wrong`).
/// A wrong key never touches the buffer.

use super::kana::{
    default_keys_per_syllable, patterns_for, split_syllables, starts_ambiguous_after_nasal,
    GEMINATE_MARKER, MORAIC_NASAL, NASAL_KEY, VOWELS,
};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum KeyOutcome {
    Wrong,
    Correct,
    Complete,
}

#[derive(Clone, Debug)]
pub struct CharState {
    pub syllable: String,
    pub patterns: Vec<Vec<char>>,
    pub buffer: Vec<char>,
    pub completed: bool,
}

enum PatternMatch {
    Exact,
    Prefix,
    None,
}

#[derive(Clone, Debug)]
pub struct Matcher {
    chars: Vec<CharState>,
    cursor: usize,
    /// Canonical spelling per syllable, for the guide.
    guide: Vec<String>,
}

impl Matcher {
    pub fn new(kana: &str) -> Self {
        let syllables = split_syllables(kana);
        let guide = default_keys_per_syllable(&syllables);
        let chars = syllables
            .into_iter()
            .map(|syllable| CharState {
                patterns: patterns_for(&syllable),
                syllable,
                buffer: Vec::new(),
                completed: false,
            })
            .collect();
        Matcher { chars, cursor: 0, guide }
    }

    /// Feed one key. Case-insensitive. Control keys must be filtered out by
    /// the caller.
    pub fn process_key(&mut self, key: char) -> KeyOutcome {
        let key = key.to_ascii_lowercase();
        if self.is_complete() {
            return KeyOutcome::Complete;
        }

        // っ: borrow the next syllable's leading consonant.
        if self.geminate_applies(key) {
            self.finish_current();
            return self.process_key(key);
        }

        // ん: a single n is enough unless the next syllable could start with n.
        if self.nasal_applies(key) {
            self.finish_current();
            return self.progress();
        }

        let i = self.cursor;
        let mut candidate = self.chars[i].buffer.clone();
        candidate.push(key);
        match match_patterns(&self.chars[i].patterns, &candidate) {
            PatternMatch::Exact => {
                self.chars[i].buffer = candidate;
                self.finish_current();
                self.progress()
            }
            PatternMatch::Prefix => {
                self.chars[i].buffer = candidate;
                KeyOutcome::Correct
            }
            PatternMatch::None => KeyOutcome::Wrong,
        }
    }

    fn geminate_applies(&self, key: char) -> bool {
        let cur = &self.chars[self.cursor];
        if cur.syllable != GEMINATE_MARKER || !cur.buffer.is_empty() {
            return false;
        }
        if !cur.patterns.iter().all(|p| matches!(p.first(), Some('x' | 'l'))) {
            return false;
        }
        let Some(next) = self.chars.get(self.cursor + 1) else {
            return false;
        };
        !VOWELS.contains(&key) && next.patterns.iter().any(|p| p.first() == Some(&key))
    }

    fn nasal_applies(&self, key: char) -> bool {
        let cur = &self.chars[self.cursor];
        if cur.syllable != MORAIC_NASAL || key != NASAL_KEY || !cur.buffer.is_empty() {
            return false;
        }
        match self.chars.get(self.cursor + 1) {
            Some(next) => !starts_ambiguous_after_nasal(&next.patterns),
            None => true,
        }
    }

    fn finish_current(&mut self) {
        self.chars[self.cursor].completed = true;
        self.cursor += 1;
    }

    fn progress(&self) -> KeyOutcome {
        if self.is_complete() {
            KeyOutcome::Complete
        } else {
            KeyOutcome::Correct
        }
    }

    pub fn is_complete(&self) -> bool {
        self.cursor >= self.chars.len()
    }

    /// Number of finished syllables; also the index of the current one.
    pub fn completed_count(&self) -> usize {
        self.cursor
    }

    pub fn total_count(&self) -> usize {
        self.chars.len()
    }

    /// Keys typed so far toward the current syllable. Empty once complete.
    pub fn current_buffer(&self) -> &[char] {
        self.chars
            .get(self.cursor)
            .map(|c| c.buffer.as_slice())
            .unwrap_or(&[])
    }

    pub fn syllables(&self) -> impl Iterator<Item = &str> {
        self.chars.iter().map(|c| c.syllable.as_str())
    }

    /// Canonical key string for the whole target.
    pub fn guide(&self) -> String {
        self.guide.concat()
    }

    /// How many leading characters of `guide()` count as typed: the canonical
    /// spelling of every finished syllable plus the live buffer length.
    /// The buffer never counts past the current syllable's last character,
    /// since a longer alternate spelling may still be in progress.
    pub fn guide_position(&self) -> usize {
        let done: usize = self.guide[..self.cursor].iter().map(|g| g.chars().count()).sum();
        let canon = self.guide.get(self.cursor).map_or(0, |g| g.chars().count());
        done + self.current_buffer().len().min(canon.saturating_sub(1))
    }
}

fn match_patterns(patterns: &[Vec<char>], input: &[char]) -> PatternMatch {
    let mut partial = false;
    for pattern in patterns {
        if !pattern.starts_with(input) {
            continue;
        }
        if pattern.len() == input.len() {
            return PatternMatch::Exact;
        }
        partial = true;
    }
    if partial {
        PatternMatch::Prefix
    } else {
        PatternMatch::None
    }
}
