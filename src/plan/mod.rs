/// Bounded greedy round-robin allocator.
pub mod allocator;
pub mod engine;
/// Topology-to-slot-list resolution.
pub mod resolver;
pub mod status;
pub mod summary;
/// Lineup catalog and device selection.
pub mod topology;
pub mod types;
