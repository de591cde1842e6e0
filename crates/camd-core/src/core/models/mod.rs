pub mod candidate;
pub mod hansen;
pub mod sense;
