pub mod audio;
pub mod bindings;
pub mod cues;
pub mod event;
pub mod session;
