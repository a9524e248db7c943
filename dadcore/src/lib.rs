pub mod error;
pub mod config;
pub mod pipeline;

pub mod data {
    pub mod dataset;
}

pub mod algorithm {
    pub mod utility;
    pub mod similarity;
    pub mod regression;
}

pub mod peak;

pub mod database {
    pub mod component;
    pub mod quantification;
}

pub mod simulation {
    pub mod chromatogram;
}

#[cfg(test)]
pub(crate) mod fixtures;
