// Filesystem side of the engine: reading the simulation's dump directory and
// log, and writing graphs out for graphviz.

pub mod datadir;
pub mod dot;
pub mod simulation;
