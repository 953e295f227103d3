mod parse;
mod record;

pub use parse::load_events;
pub use record::{EventRecord, NodeKind};
