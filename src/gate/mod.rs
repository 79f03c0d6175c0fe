mod requirement;
pub use requirement::Requirement;

mod decision;
pub use decision::{route, Decision, RenderTarget};

mod gate;
pub use gate::{decide, Gate, GateStatus, Navigator};
