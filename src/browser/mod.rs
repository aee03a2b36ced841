pub mod element;
pub mod multiremote;
pub mod session;

pub use element::Element;
pub use multiremote::MultiremoteBrowser;
pub use session::Browser;
