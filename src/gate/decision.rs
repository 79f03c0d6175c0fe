pub mod route {
    pub const LOGIN: &str = "/login";
    pub const HOME: &str = "/home";
    pub const ADMIN: &str = "/admin";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderTarget {
    /// The protected content itself.
    Children,
    /// The view supplied unauthenticated fallback.
    Fallback,
}

/// Instruction returned to a protected view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Show a non interactive loading indicator, nothing else.
    Wait,
    Redirect(&'static str),
    Render(RenderTarget),
    /// The profile could not be loaded before the deadline.
    Unavailable,
}
