//! Menu registry.
//!
//! Menus are rendered by the backend; the core only knows their names and
//! which view the last opening was for.

use indexmap::IndexMap;

use crate::view::ViewId;

/// Window menu, anchored relative to the view it acts on.
pub const CLIENT_MENU: &str = "client-menu";
/// Desktop menu.
pub const ROOT_MENU: &str = "root-menu";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Menu {
    pub id: String,
    /// View the menu was last opened for; cleared when that view dies.
    pub triggered_by_view: Option<ViewId>,
}

#[derive(Debug, Default)]
pub struct Menus {
    menus: IndexMap<String, Menu>,
}

impl Menus {
    /// Register the configured menus. The built-in menus always exist.
    pub fn new(names: &[String]) -> Self {
        let mut menus = IndexMap::new();
        let builtin = [ROOT_MENU, CLIENT_MENU];
        for name in builtin.into_iter().chain(names.iter().map(String::as_str)) {
            menus.entry(name.to_string()).or_insert_with(|| Menu {
                id: name.to_string(),
                triggered_by_view: None,
            });
        }
        Self { menus }
    }

    pub fn get(&self, name: &str) -> Option<&Menu> {
        self.menus.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Menu> {
        self.menus.get_mut(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Menu> {
        self.menus.values()
    }

    pub(crate) fn forget_view(&mut self, view: ViewId) {
        for menu in self.menus.values_mut() {
            if menu.triggered_by_view == Some(view) {
                menu.triggered_by_view = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_menus_exist() {
        let menus = Menus::new(&["apps".to_string(), ROOT_MENU.to_string()]);
        assert!(menus.get(ROOT_MENU).is_some());
        assert!(menus.get(CLIENT_MENU).is_some());
        assert!(menus.get("apps").is_some());
        assert_eq!(menus.iter().count(), 3);
    }

    #[test]
    fn test_forget_view() {
        let mut menus = Menus::new(&[]);
        menus.get_mut(CLIENT_MENU).unwrap().triggered_by_view = Some(ViewId(4));
        menus.forget_view(ViewId(5));
        assert_eq!(menus.get(CLIENT_MENU).unwrap().triggered_by_view, Some(ViewId(4)));
        menus.forget_view(ViewId(4));
        assert_eq!(menus.get(CLIENT_MENU).unwrap().triggered_by_view, None);
    }
}
