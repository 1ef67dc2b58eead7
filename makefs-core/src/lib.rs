#![forbid(unsafe_code)]

pub mod config;
pub mod error;

pub mod walk {
    pub mod enumerate;
}

pub mod naming;

pub mod http {
    pub mod header;
}

pub mod codec {
    pub mod deflate;
}

pub mod emit {
    pub mod artifact;
    pub mod record;
}

pub mod generate;

// Re-exports: stable API surface
pub use config::FsConfig;
pub use generate::{GenOutcome, generate};
