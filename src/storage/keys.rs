//! Slot names
//!
//! These match the keys the browser build used in local storage, so an
//! exported local-storage dump can be loaded slot for slot.

/// Library session messages (JSON array)
pub const LIBRARY_MESSAGES: &str = "story_weaver_library_messages";

/// Scriptorium session messages (JSON array)
pub const SCRIPTORIUM_MESSAGES: &str = "story_weaver_scriptorium_messages";

/// Scriptorium treatise (raw text)
pub const TREATISE: &str = "story_weaver_scriptorium_treatise";

/// Active surface (`library` or `scriptorium`)
pub const VIEW_MODE: &str = "story_weaver_view_mode";

/// Colour theme (`light` or `dark`)
pub const THEME: &str = "theme";
