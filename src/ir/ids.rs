//! Node id allocation for tree builds
//!
//! One allocator is created per adapter run and passed `&mut` through the
//! recursive build functions, so ids are reproducible for a given input and
//! two builds never share a counter.

#[derive(Debug, Clone, Default)]
pub struct NodeIdAllocator {
    next: u32,
}

impl NodeIdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate `<kind>-<n>`; `n` increases across all kinds.
    pub fn next_id(&mut self, kind: &str) -> String {
        self.next += 1;
        format!("{}-{}", kind, self.next)
    }

    /// Number of ids handed out so far
    pub fn allocated(&self) -> u32 {
        self.next
    }
}
