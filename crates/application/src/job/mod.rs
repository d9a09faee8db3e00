pub mod session;
pub mod workaround;

pub use session::JobSession;
