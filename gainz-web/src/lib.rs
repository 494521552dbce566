#![forbid(unsafe_code)]
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

pub mod consent;
pub mod dom;
pub mod paths;
pub mod session;
pub mod storage;
pub mod theme;
pub mod transport;

pub use consent::{ConsentPanel, WebEngine, create_web_engine};
pub use session::{CalcSession, SessionError};
pub use storage::{WebConsentStorage, WebKeyVault, WebStorageError};
pub use theme::{ThemeHandle, WebThemePreferences};
pub use transport::{FetchTransport, TransportError};

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    // Paint the saved or system theme before the host page mounts anything
    crate::theme::apply_theme(crate::theme::initial_theme());
}
