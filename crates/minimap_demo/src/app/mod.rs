pub(crate) mod bootstrap;
pub(crate) mod loop_runner;
mod world;
