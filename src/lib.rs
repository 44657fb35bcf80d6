pub mod graph;
pub mod gen_data;
pub mod objective;
pub mod floor;
pub mod rng;
pub mod algorithms;

/// Seam between area data and the solvers that regionalize it.
///
/// The generic argument `M` is whatever a solver needs to group areas into
/// regions; for the max-p heuristic that is the contiguity graph together
/// with the attribute matrix and the floor-variable vector. A solver fills
/// `part_ids` only when it finds a partition in which every region is
/// connected and meets its floor; failing that it returns its error type
/// untouched, leaving `part_ids` as the caller supplied it.
pub trait Partition<M> {
    /// Diagnostics about the partition that was produced, e.g. how many
    /// regions were formed and the objective they reached.
    type Metadata;

    /// Why no feasible partition could be produced.
    type Error;

    /// Assign every area an ID in `part_ids`. IDs are compact and start at
    /// zero, so the region count is one plus the largest ID written.
    fn partition(&mut self, part_ids: &mut [usize], data: M)
                 -> Result<Self::Metadata, Self::Error>;
}
