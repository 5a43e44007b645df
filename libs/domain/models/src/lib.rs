pub mod navigation;
pub mod reference;
pub mod command;
pub mod control;
pub mod capture;
pub mod zap;
pub mod telemetry;

pub use navigation::{
    NavigationTree, NavigationNode, NavigationEdge, NodeType, ActionSet, Action, Verification,
    VerificationType, PassCondition, Area,
};
pub use reference::Reference;
pub use command::{CommandSpec, CommandKind, ValidationOutcome, ValidationIssue};
pub use control::{DeviceLease, TakeControlRequest, TakeControlError};
pub use capture::{CaptureFrameRecord, FrameAnalysis};
pub use zap::{ZapEvent, ZapMethod, ZapRunStats};
pub use telemetry::SystemLog;
