//! Late-bound render assets
//!
//! An `AssetSlot` starts empty and is filled whenever a load completes.
//! Frames never wait for it; until then the renderer draws a placeholder.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Shared, optionally-populated asset reference
pub struct AssetSlot<T> {
    value: Rc<RefCell<Option<T>>>,
    generation: Rc<Cell<u64>>,
}

impl<T> Clone for AssetSlot<T> {
    fn clone(&self) -> Self {
        Self {
            value: Rc::clone(&self.value),
            generation: Rc::clone(&self.generation),
        }
    }
}

impl<T> Default for AssetSlot<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> AssetSlot<T> {
    pub fn empty() -> Self {
        Self {
            value: Rc::new(RefCell::new(None)),
            generation: Rc::new(Cell::new(0)),
        }
    }

    pub fn with_value(value: T) -> Self {
        let slot = Self::empty();
        slot.set(value);
        slot
    }

    /// Start a new load. Any load begun earlier can no longer fill the slot.
    pub fn begin_load(&self) -> u64 {
        let ticket = self.generation.get() + 1;
        self.generation.set(ticket);
        ticket
    }

    /// Complete the load identified by `ticket`. Stale tickets are ignored.
    pub fn fill(&self, ticket: u64, value: T) -> bool {
        if ticket != self.generation.get() {
            return false;
        }
        *self.value.borrow_mut() = Some(value);
        true
    }

    /// Replace the contents immediately, superseding pending loads
    pub fn set(&self, value: T) {
        let ticket = self.begin_load();
        self.fill(ticket, value);
    }

    pub fn clear(&self) {
        self.begin_load();
        self.value.borrow_mut().take();
    }

    pub fn is_loaded(&self) -> bool {
        self.value.borrow().is_some()
    }

    /// Run `f` against the asset if it is present
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        self.value.borrow().as_ref().map(f)
    }
}

/// Decode an image from `src` into `slot` in the background.
/// The previous image stays in place until the new one is ready.
#[cfg(target_arch = "wasm32")]
pub fn load_image(slot: &AssetSlot<web_sys::HtmlImageElement>, src: &str) {
    use wasm_bindgen_futures::JsFuture;

    let ticket = slot.begin_load();
    let slot = slot.clone();
    let src = src.to_string();
    wasm_bindgen_futures::spawn_local(async move {
        let image = match web_sys::HtmlImageElement::new() {
            Ok(image) => image,
            Err(e) => {
                log::warn!("Cannot create image element: {e:?}");
                return;
            }
        };
        image.set_src(&src);
        match JsFuture::from(image.decode()).await {
            Ok(_) => {
                if !slot.fill(ticket, image) {
                    log::debug!("Discarded superseded image load");
                }
            }
            Err(e) => log::warn!("Image failed to load, using placeholder: {e:?}"),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_starts_empty() {
        let slot: AssetSlot<u32> = AssetSlot::empty();
        assert!(!slot.is_loaded());
        assert_eq!(slot.with(|v| *v), None);
    }

    #[test]
    fn test_stale_load_is_ignored() {
        let slot = AssetSlot::empty();
        let first = slot.begin_load();
        let second = slot.begin_load();
        assert!(slot.fill(second, "new"));
        assert!(!slot.fill(first, "old"));
        assert_eq!(slot.with(|v| *v), Some("new"));
    }

    #[test]
    fn test_clones_share_contents() {
        let slot = AssetSlot::empty();
        let other = slot.clone();
        other.set(7);
        assert_eq!(slot.with(|v| *v), Some(7));
        slot.clear();
        assert!(!other.is_loaded());
    }
}
