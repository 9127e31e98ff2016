pub mod problem;
pub mod shared;
pub mod solution;
pub mod submission;

pub use problem::{NewProblem, Problem};
pub use solution::{DedupReport, EvaluationTarget, NewSolution, Solution, SolutionAdded};
pub use submission::{RunningTask, SubmittedSolution};
