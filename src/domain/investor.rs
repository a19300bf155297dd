//! Investors who own portfolios.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InvestorId(pub u32);

impl fmt::Display for InvestorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Investor {
    pub id: InvestorId,
    pub name: String,
}

impl Investor {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Investor {
            id: InvestorId(id),
            name: name.into(),
        }
    }
}
