pub mod dependents;
pub mod output;
pub mod report;
