//! View and session models for the admin console.

pub mod form;
pub mod layout;
pub mod list;
pub mod session;

pub use form::{FormData, FormErrors, SelectOption};
pub use layout::{AdminLayout, set_flash};
pub use list::Pager;
pub use session::{CurrentAdmin, Flash, FlashLevel, keys};
