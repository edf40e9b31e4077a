pub mod mixer_state;
pub mod serialization;
