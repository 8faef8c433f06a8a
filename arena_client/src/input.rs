//! Input handling.
//!
//! In a real client this would integrate with windowing, raw mouse/keyboard and
//! action bindings. Here it is reduced to the two local intents the viewer reacts
//! to before the server has seen them.

use arena_shared::{math::Vec3, net::ActionRequest};

/// Local controller intent.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// The player asked for an action; it is also sent to the server.
    Action(ActionRequest),
    /// The player clicked a destination.
    Move(Vec3),
}
