use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::raw_course::Record;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MenuItem {
    #[serde(rename = "ID", alias = "id", default)]
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Menu {
    pub items: Vec<MenuItem>,
}

impl Menu {
    /// Reads `{ "items": [...] }` or a bare item array; `None` when there
    /// are no items.
    pub fn from_value(body: &Value) -> Option<Menu> {
        let items = match body {
            Value::Array(items) => items,
            Value::Object(map) => map.get("items")?.as_array()?,
            _ => return None,
        };
        let items: Vec<MenuItem> = items
            .iter()
            .filter_map(|item| Record::from_value(item.clone()))
            .map(|record| MenuItem::from_record(&record))
            .collect();
        (!items.is_empty()).then_some(Menu { items })
    }
}

impl MenuItem {
    /// Lenient read of one menu entry: `ID` or `id`, numeric strings
    /// allowed, title as text or `{rendered}`.
    pub fn from_record(record: &Record) -> MenuItem {
        MenuItem {
            id: record.id("ID").or_else(|| record.id("id")).unwrap_or(0),
            title: record.rendered("title").unwrap_or_default(),
            url: record.text("url").unwrap_or_default(),
        }
    }
}

impl Default for Menu {
    fn default() -> Self {
        let items = [
            (1, "Home", "/"),
            (2, "Opleidingen", "/opleidingen"),
            (3, "Over Ons", "/over-ons"),
            (4, "Contact", "/contact"),
        ]
        .into_iter()
        .map(|(id, title, url)| MenuItem {
            id,
            title: title.to_string(),
            url: url.to_string(),
        })
        .collect();
        Menu { items }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_both_menu_shapes() {
        let wrapped = json!({ "items": [{ "ID": 9, "title": "Blog", "url": "/blog" }] });
        assert_eq!(Menu::from_value(&wrapped).unwrap().items[0].id, 9);
        let bare = json!([{ "id": 3, "title": "Home", "url": "/" }]);
        assert_eq!(Menu::from_value(&bare).unwrap().items[0].title, "Home");
    }

    #[test]
    fn reads_loosely_typed_items() {
        let body = json!({ "items": [
            { "ID": 5, "id": 5, "title": "Blog", "url": "/blog" },
            { "ID": "6", "title": { "rendered": "Contact" }, "url": "/contact" },
            "geen item"
        ] });
        let menu = Menu::from_value(&body).unwrap();
        assert_eq!(menu.items.len(), 2);
        assert_eq!(menu.items[0].id, 5);
        assert_eq!(menu.items[0].title, "Blog");
        assert_eq!(menu.items[1].id, 6);
        assert_eq!(menu.items[1].title, "Contact");
        assert_eq!(menu.items[1].url, "/contact");
    }

    #[test]
    fn empty_menus_are_rejected() {
        assert!(Menu::from_value(&json!({ "items": [] })).is_none());
        assert!(Menu::from_value(&json!({ "name": "primary" })).is_none());
        assert!(Menu::from_value(&json!("primary")).is_none());
    }

    #[test]
    fn default_menu_has_four_items() {
        let titles: Vec<_> = Menu::default().items.into_iter().map(|i| i.title).collect();
        assert_eq!(titles, ["Home", "Opleidingen", "Over Ons", "Contact"]);
    }
}
