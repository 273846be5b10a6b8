pub mod sink;
pub mod store;
pub mod trigger;

pub use sink::RecordSink;
pub use store::ConfigStore;
pub use trigger::{EntrySnapshot, Job, TriggerEngine};
