//! Field-equality filters used by repository lookups.

use super::field::FieldValue;

/// Ordered mapping of field names to the values a record must hold.
///
/// Setting the same field twice keeps the position of the first entry and
/// the value of the last one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Lookup {
    entries: Vec<(String, FieldValue)>,
}

impl Lookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Lookup::set`].
    pub fn with(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.set(field, value);
        self
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<FieldValue>) {
        let field = field.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(name, _)| *name == field) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((field, value)),
        }
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.entries
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for Lookup {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut lookup = Self::new();
        for (field, value) in iter {
            lookup.set(field, value);
        }
        lookup
    }
}

#[cfg(test)]
mod tests {
    use super::Lookup;
    use crate::model::FieldValue;

    #[test]
    fn repeated_field_keeps_position_and_last_value() {
        let lookup = Lookup::new()
            .with("path", "a.txt")
            .with("size", 1_i64)
            .with("path", "b.txt");

        assert_eq!(lookup.len(), 2);
        assert_eq!(lookup.fields().collect::<Vec<_>>(), ["path", "size"]);
        assert_eq!(lookup.get("path"), Some(&FieldValue::from("b.txt")));
    }

    #[test]
    fn collects_from_pairs() {
        let lookup: Lookup = [("path", "a.txt"), ("owner", "ops")].into_iter().collect();
        assert_eq!(lookup.get("owner"), Some(&FieldValue::from("ops")));
        assert!(lookup.get("missing").is_none());
    }
}
