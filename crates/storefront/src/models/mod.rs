//! View and session models.

pub mod form;
pub mod layout;
pub mod session;

pub use form::{FormErrors, SelectOption};
pub use layout::{LayoutContext, set_flash};
pub use session::{AuthSession, Flash, FlashLevel, keys};
