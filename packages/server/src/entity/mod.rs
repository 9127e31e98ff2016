pub mod problem;
pub mod running_task;
pub mod solution;
pub mod solution_blob;
pub mod solution_tag;
pub mod submitted_solution;
