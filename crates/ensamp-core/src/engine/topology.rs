//! Walker-topology arithmetic over communicator metadata.
//!
//! A multi-walker run partitions a global communicator into equally sized
//! per-walker sub-communicators. Everything this module derives is pure
//! arithmetic over rank and size; the message-passing layer supplies the
//! handles, and no process-wide communicator singleton is consulted.

use thiserror::Error;

/// Errors raised when constructing a communicator handle.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TopologyError {
    #[error("communicator size must be at least 1")]
    EmptyCommunicator,

    #[error("rank {rank} out of range for communicator of size {size}")]
    RankOutOfRange { rank: usize, size: usize },
}

/// The metadata a message-passing communicator must expose.
///
/// Implemented by whatever handle the hosting MPI (or equivalent) binding
/// provides; [`ProcessGroup`] is the built-in value-type implementation for
/// serial runs and tests.
pub trait Communicator {
    /// This process's rank within the communicator.
    fn rank(&self) -> usize;

    /// The number of processes in the communicator.
    fn size(&self) -> usize;
}

/// Returns the walker index of this process.
///
/// Walkers occupy contiguous rank blocks of the world communicator, one block
/// per walker sub-communicator.
pub fn walker_id(world: &impl Communicator, walker: &impl Communicator) -> usize {
    world.rank() / walker.size()
}

/// Returns the total number of walkers in the run.
pub fn walker_count(world: &impl Communicator, walker: &impl Communicator) -> usize {
    world.size() / walker.size()
}

/// Returns `true` on the rank-0 process of a communicator.
///
/// Used to gate single-writer operations (file output, logging) to exactly one
/// process per walker.
pub fn is_master_rank(comm: &impl Communicator) -> bool {
    comm.rank() == 0
}

/// A plain rank/size pair implementing [`Communicator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessGroup {
    rank: usize,
    size: usize,
}

impl ProcessGroup {
    /// Creates a communicator handle from explicit rank and size.
    ///
    /// # Errors
    ///
    /// Returns a [`TopologyError`] for a zero-sized communicator or a rank
    /// outside `[0, size)`.
    pub fn new(rank: usize, size: usize) -> Result<Self, TopologyError> {
        if size == 0 {
            return Err(TopologyError::EmptyCommunicator);
        }
        if rank >= size {
            return Err(TopologyError::RankOutOfRange { rank, size });
        }
        Ok(Self { rank, size })
    }

    /// The single-process communicator of a serial run.
    pub fn solo() -> Self {
        Self { rank: 0, size: 1 }
    }
}

impl Communicator for ProcessGroup {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranks_partition_into_contiguous_walkers() {
        // 8 world ranks, 4 ranks per walker: two walkers.
        let walker_size = 4;
        for world_rank in 0..8 {
            let world = ProcessGroup::new(world_rank, 8).unwrap();
            let walker = ProcessGroup::new(world_rank % walker_size, walker_size).unwrap();

            assert_eq!(walker_id(&world, &walker), world_rank / walker_size);
            assert_eq!(walker_count(&world, &walker), 2);
            assert_eq!(is_master_rank(&walker), world_rank % walker_size == 0);
        }
    }

    #[test]
    fn serial_run_is_a_single_master_walker() {
        let solo = ProcessGroup::solo();
        assert_eq!(walker_id(&solo, &solo), 0);
        assert_eq!(walker_count(&solo, &solo), 1);
        assert!(is_master_rank(&solo));
    }

    #[test]
    fn invalid_process_groups_are_rejected() {
        assert_eq!(
            ProcessGroup::new(0, 0),
            Err(TopologyError::EmptyCommunicator)
        );
        assert_eq!(
            ProcessGroup::new(3, 3),
            Err(TopologyError::RankOutOfRange { rank: 3, size: 3 })
        );
    }
}
