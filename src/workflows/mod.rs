pub mod aggregator;
pub mod matchers;
pub mod renamer;
