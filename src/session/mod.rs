mod principal;
pub use principal::{Principal, User};

mod profile;
pub use profile::{Profile, Role};

mod state;
pub use state::SessionState;

mod command;

mod store;
pub use store::{Builder, SessionStore};

mod handle;
pub use handle::SessionHandle;
