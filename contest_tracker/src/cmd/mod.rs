pub mod server;
pub mod sync;

use clap::ValueEnum;
use std::fmt;

#[derive(Debug, ValueEnum, Clone, PartialEq, Eq)]
pub enum TargetDomain {
    Contests,
    SolutionLinks,
}

impl fmt::Display for TargetDomain {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TargetDomain::Contests => write!(f, "contests"),
            TargetDomain::SolutionLinks => write!(f, "solution-links"),
        }
    }
}
