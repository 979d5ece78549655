//! Stream definitions for the sync pipeline.

use std::fmt;

/// One of the three independent entity streams the pipeline syncs.
///
/// Each stream owns a target index and a checkpoint key; streams progress
/// independently and never coordinate beyond the cross-referential
/// `modified`-bump convention enforced on the relational side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamKind {
    /// Film works with embedded category and person snapshots.
    Works,
    /// People with their per-film role sets.
    People,
    /// Categories.
    Categories,
}

impl StreamKind {
    /// All streams, in the order the orchestrator drives them.
    pub const ALL: [StreamKind; 3] = [StreamKind::Works, StreamKind::People, StreamKind::Categories];

    /// Name of the search index this stream loads into.
    pub fn index_name(&self) -> &'static str {
        match self {
            Self::Works => "works",
            Self::People => "people",
            Self::Categories => "categories",
        }
    }

    /// Key under which this stream's watermark is checkpointed.
    pub fn watermark_key(&self) -> &'static str {
        match self {
            Self::Works => "last_works_updated",
            Self::People => "last_people_updated",
            Self::Categories => "last_categories_updated",
        }
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.index_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_names() {
        assert_eq!(StreamKind::Works.index_name(), "works");
        assert_eq!(StreamKind::People.index_name(), "people");
        assert_eq!(StreamKind::Categories.index_name(), "categories");
    }

    #[test]
    fn test_watermark_keys() {
        assert_eq!(StreamKind::Works.watermark_key(), "last_works_updated");
        assert_eq!(StreamKind::People.watermark_key(), "last_people_updated");
        assert_eq!(
            StreamKind::Categories.watermark_key(),
            "last_categories_updated"
        );
    }

    #[test]
    fn test_all_streams_have_distinct_keys() {
        let keys: Vec<_> = StreamKind::ALL.iter().map(|s| s.watermark_key()).collect();
        let mut deduped = keys.clone();
        deduped.dedup();
        assert_eq!(keys.len(), 3);
        assert_eq!(deduped.len(), 3);
    }

    #[test]
    fn test_display_matches_index_name() {
        for stream in StreamKind::ALL {
            assert_eq!(stream.to_string(), stream.index_name());
        }
    }
}
