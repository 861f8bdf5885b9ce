//! Session engine: orchestration, actions and prompt dispatch.

pub mod actions;
pub mod dispatch;
pub mod inflight;
pub mod notice;
pub mod orchestrator;
pub mod view;

pub use actions::regenerate_prompt;
pub use dispatch::{Route, TRIGGERS, route_for};
pub use inflight::{InFlight, InFlightGuard};
pub use notice::{Notice, NoticeLevel};
pub use orchestrator::{LoadOptions, Orchestrator, Transition};
pub use view::SessionView;
