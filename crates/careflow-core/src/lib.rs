pub mod config;
pub mod documents;
pub mod error;
pub mod extract;
pub mod load;
pub mod pipeline;
pub mod transform;
