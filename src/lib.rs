pub mod align;
pub mod cfn;
pub mod cli;
pub mod evidence;
pub mod graph;
pub mod partition;
pub mod seq;
pub mod solver;
pub mod utils;
