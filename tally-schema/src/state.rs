use std::sync::Arc;

use parking_lot::RwLock;

/// Process-wide handle on the schema version published after a lifecycle
/// run reaches Ready.
///
/// Cheap to clone; downstream collaborators (seed data generation, version
/// display) read it after startup. `None` until the lifecycle has published.
#[derive(Debug, Clone, Default)]
pub struct PublishedVersion(Arc<RwLock<Option<i64>>>);

impl PublishedVersion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<i64> {
        *self.0.read()
    }

    pub(crate) fn publish(&self, version: i64) {
        *self.0.write() = Some(version);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_published_value() {
        let version = PublishedVersion::new();
        let reader = version.clone();

        assert_eq!(reader.get(), None);
        version.publish(24);
        assert_eq!(reader.get(), Some(24));
    }
}
