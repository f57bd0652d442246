//! Top level drivers tying the pipeline together.

use crate::algorithm::Algorithm;
use crate::checkpoint::ResumeState;
use crate::controller::Controller;
use crate::error::Result;
use crate::extract::{SolutionBasis, extract};
use crate::lattice::Lattice;
use crate::options::Variant;
use crate::rings::Int;
use crate::system::LinearSystem;

/// Validates the input, builds the kernel lattice and runs the completion to
/// the final generating sets.
pub fn solve_system<I: Int, C: Controller<I>>(
    system: LinearSystem<I>,
    variant: Variant,
    controller: &mut C,
) -> Result<SolutionBasis<I>> {
    variant.validate(&system)?;
    let (matrix, properties) = system.homogenize()?;
    let lattice = Lattice::kernel_of(&matrix, properties)?;
    let mut algorithm = Algorithm::new(lattice)?;
    algorithm.run(controller)?;
    extract(algorithm.lattice())
}

/// Continues an interrupted run from its checkpointed state.
pub fn resume_solve<I: Int, C: Controller<I>>(
    state: ResumeState<I>,
    controller: &mut C,
) -> Result<SolutionBasis<I>> {
    log::info!(
        "resuming at variable {}, norm {}",
        state.current_variable + 1,
        state.sum_norm
    );
    let mut algorithm = Algorithm::resume(
        state.lattice,
        state.current_variable,
        state.sum_norm,
        state.first_norm,
        state.symmetric,
    )?;
    algorithm.run(controller)?;
    extract(algorithm.lattice())
}
