pub mod social;

pub use social::google_callback;
