pub mod event;
pub mod kind;
pub mod pr_model;

pub use event::{EventQueue, EventSink, GameEvent};
pub use kind::{FruitKind, RingId};
pub use pr_model::{PrPoint, PrRing};
