use std::fmt;

/// Counts from one complete migration run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub created: usize,
    pub total_items: usize,
    pub deleted: usize,
}

impl fmt::Display for MigrationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} migration completed out of {} and {} existing nodes deleted.",
            self.created, self.total_items, self.deleted
        )
    }
}
