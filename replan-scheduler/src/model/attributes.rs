use std::collections::BTreeMap;

use super::Element;

/// Integer attributes attached to the elements of a model, e.g. the duration of a migration.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Attributes {
    values: BTreeMap<(Element, String), i32>,
}

impl Attributes {
    /// Sets the attribute `key` of `element`, returning the previous value.
    pub fn put(
        &mut self,
        element: impl Into<Element>,
        key: impl Into<String>,
        value: i32,
    ) -> Option<i32> {
        self.values.insert((element.into(), key.into()), value)
    }

    pub fn get(&self, element: impl Into<Element>, key: &str) -> Option<i32> {
        self.values.get(&(element.into(), key.to_owned())).copied()
    }

    pub fn remove(&mut self, element: impl Into<Element>, key: &str) -> Option<i32> {
        self.values.remove(&(element.into(), key.to_owned()))
    }

    /// The keys of the attributes of `element`.
    pub fn keys(&self, element: impl Into<Element>) -> impl Iterator<Item = &str> + '_ {
        let element = element.into();
        self.values
            .keys()
            .filter(move |(owner, _)| *owner == element)
            .map(|(_, key)| key.as_str())
    }
}
