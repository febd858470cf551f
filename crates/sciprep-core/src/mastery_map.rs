//! Mastery-map display policy.
//!
//! The first topic of each subject is shown as `learning` even while its
//! stored status is `locked`. The override exists only in the computed
//! tiles and is never written back into `UserProgress`.

use crate::catalog::{self, TOPICS};
use crate::model::{Subject, TopicNode, TopicStatus, UserProgress};

/// One topic as the mastery map shows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicTile {
    pub topic: &'static TopicNode,
    pub stored: TopicStatus,
    pub displayed: TopicStatus,
}

impl TopicTile {
    /// A topic can start a session unless it is displayed as locked.
    pub fn is_selectable(&self) -> bool {
        self.displayed != TopicStatus::Locked
    }
}

/// Displayed status for a topic at `position` within its subject.
fn display_status(stored: TopicStatus, position: usize) -> TopicStatus {
    if stored == TopicStatus::Locked && position == 0 {
        TopicStatus::Learning
    } else {
        stored
    }
}

/// Tiles for one subject, in catalog order.
pub fn subject_tiles(progress: &UserProgress, subject: Subject) -> Vec<TopicTile> {
    catalog::topics_for(subject)
        .enumerate()
        .map(|(position, topic)| {
            let stored = progress.topic_status(topic.id);
            TopicTile {
                topic,
                stored,
                displayed: display_status(stored, position),
            }
        })
        .collect()
}

/// The full map, one group per subject that has topics.
pub fn mastery_map(progress: &UserProgress) -> Vec<(Subject, Vec<TopicTile>)> {
    Subject::ALL
        .into_iter()
        .map(|subject| (subject, subject_tiles(progress, subject)))
        .filter(|(_, tiles)| !tiles.is_empty())
        .collect()
}

/// Tile for a single topic id, if it is in the catalog.
pub fn tile_for(progress: &UserProgress, topic_id: &str) -> Option<TopicTile> {
    let topic = TOPICS.iter().find(|t| t.id == topic_id)?;
    subject_tiles(progress, topic.subject)
        .into_iter()
        .find(|tile| tile.topic.id == topic_id)
}
