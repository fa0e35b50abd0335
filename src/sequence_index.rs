/// Sequence name dictionary: maps names to compact integer IDs and lengths
use indexmap::IndexMap;

/// Maps sequence names to compact integer IDs, remembering each sequence's length.
///
/// IDs are assigned in first-seen order, so `id` is also the position in the
/// underlying map.
#[derive(Debug, Clone, Default)]
pub struct SequenceIndex {
    seqs: IndexMap<String, u64>,
}

impl SequenceIndex {
    /// Create a new empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create an ID for a sequence name.
    ///
    /// The first length registered for a name wins; `put` never changes it.
    pub fn put(&mut self, name: &str, len: u64) -> u32 {
        if let Some(id) = self.seqs.get_index_of(name) {
            return id as u32;
        }
        let (id, _) = self.seqs.insert_full(name.to_string(), len);
        id as u32
    }

    /// Get the ID for a name (returns None if not found)
    pub fn get(&self, name: &str) -> Option<u32> {
        self.seqs.get_index_of(name).map(|id| id as u32)
    }

    /// Get the name for an ID
    pub fn name(&self, id: u32) -> Option<&str> {
        self.seqs.get_index(id as usize).map(|(name, _)| name.as_str())
    }

    /// Get the registered length for an ID
    pub fn len_of(&self, id: u32) -> Option<u64> {
        self.seqs.get_index(id as usize).map(|(_, &len)| len)
    }

    /// Number of unique sequences
    pub fn len(&self) -> usize {
        self.seqs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seqs.is_empty()
    }

    /// Sum of all registered sequence lengths
    pub fn total_length(&self) -> u64 {
        self.seqs.values().sum()
    }
}
