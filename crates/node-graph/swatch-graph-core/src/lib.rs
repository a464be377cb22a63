pub mod config;
pub mod dispatch;
pub mod graph;
pub mod host;
pub mod ramp;
pub mod resolver;
pub mod types;
pub mod walk;

pub use config::{PurposeDefaults, ResolverConfig, TableOverrides};
pub use dispatch::{
    DispatchEntry, DispatchTable, DispatchTables, Evaluator, MatchPolicy, Purpose, TableEntry,
};
pub use graph::{GraphError, MaterialGraph, NodeHandle, TreeHandle};
pub use host::{ClampMode, Direction, MixDataType, NodeGraph, NodeKind, SocketRef};
pub use ramp::{ColorRamp, RampElement, RampInterpolation};
pub use resolver::{Appearance, MaterialResolver};
pub use types::*;
pub use walk::{find_output, ImageSampler, Quantity, WalkError, WalkSettings, Walker};
