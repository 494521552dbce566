//! Browser side of the theme store: `localStorage`, `matchMedia` and the
//! `data-theme` attribute on `<html>`.

use gainz_core::{THEME_STORAGE_KEY, Theme, ThemePreferences, ThemeStore};
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;

use crate::dom;

const DARK_QUERY: &str = "(prefers-color-scheme: dark)";

/// Saved choice under the `tg_theme` key.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebThemePreferences;

impl ThemePreferences for WebThemePreferences {
    fn load(&self) -> Option<Theme> {
        dom::local_storage()
            .ok()?
            .get_item(THEME_STORAGE_KEY)
            .ok()
            .flatten()
            .and_then(|value| value.parse().ok())
    }

    fn save(&self, theme: Theme) {
        let result = dom::local_storage()
            .and_then(|storage| storage.set_item(THEME_STORAGE_KEY, theme.as_str()));
        if let Err(err) = result {
            log::warn!("could not save theme: {}", dom::js_error_message(&err));
        }
    }
}

/// Theme reported by the operating system, dark when it cannot be read.
#[must_use]
pub fn system_theme() -> Theme {
    dom::window()
        .and_then(|win| win.match_media(DARK_QUERY).ok().flatten())
        .map_or_else(Theme::default, |query| {
            Theme::from_prefers_dark(query.matches())
        })
}

#[must_use]
pub fn initial_theme() -> Theme {
    WebThemePreferences.load().unwrap_or_else(system_theme)
}

pub fn apply_theme(theme: Theme) {
    if let Some(root) = dom::root_element() {
        let _ = root.set_attribute("data-theme", theme.as_str());
    }
}

type WebThemeStore = ThemeStore<WebThemePreferences>;

fn follow_system_changes(store: Weak<RefCell<WebThemeStore>>) {
    let Some(query) = dom::window().and_then(|win| win.match_media(DARK_QUERY).ok().flatten())
    else {
        return;
    };
    let listener_query = query.clone();
    let closure = Closure::<dyn FnMut()>::new(move || {
        if let Some(store) = store.upgrade() {
            store
                .borrow_mut()
                .on_system_change(Theme::from_prefers_dark(listener_query.matches()));
        }
    });
    if let Err(err) = query.add_event_listener_with_callback("change", closure.as_ref().unchecked_ref())
    {
        log::warn!(
            "cannot follow system theme: {}",
            dom::js_error_message(&err)
        );
    }
    closure.forget();
}

/// Handle the host page keeps for the lifetime of the app.
#[wasm_bindgen]
pub struct ThemeHandle {
    store: Rc<RefCell<WebThemeStore>>,
}

#[wasm_bindgen]
impl ThemeHandle {
    /// Initialise the store, paint the theme and follow system changes.
    #[wasm_bindgen(constructor)]
    #[must_use]
    pub fn install() -> Self {
        let store = Rc::new(RefCell::new(ThemeStore::init(
            WebThemePreferences,
            system_theme(),
        )));
        store.borrow_mut().subscribe(apply_theme);
        follow_system_changes(Rc::downgrade(&store));
        Self { store }
    }

    #[must_use]
    pub fn current(&self) -> String {
        self.store.borrow().current().to_string()
    }

    pub fn set(&self, theme: &str) -> Result<(), JsValue> {
        let theme: Theme = theme
            .parse()
            .map_err(|()| dom::to_js_error(format!("unknown theme: {theme}")))?;
        self.store.borrow_mut().set(theme);
        Ok(())
    }

    /// Switch to the other theme and return it.
    pub fn toggle(&self) -> String {
        let next = match self.store.borrow().current() {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        };
        self.store.borrow_mut().set(next);
        next.to_string()
    }
}
