include!(concat!(env!("OUT_DIR"), "/library.rs"));

/// A resolver payload with its name
#[derive(Debug, Clone)]
pub struct Entry {
    pub name: String,
    pub content: String,
}

/// Get all embedded payloads, sorted by name
pub fn get_all_entries() -> Vec<Entry> {
    LIBRARY
        .iter()
        .map(|(name, content)| Entry {
            name: name.to_string(),
            content: content.to_string(),
        })
        .collect()
}

/// Get a payload by name ("c-major-scale")
pub fn get_entry(name: &str) -> Option<Entry> {
    LIBRARY
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(name, content)| Entry {
            name: name.to_string(),
            content: content.to_string(),
        })
}

/// List all payload names
pub fn list_entries() -> Vec<&'static str> {
    LIBRARY.iter().map(|(name, _)| *name).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use keyglow::TheoryResult;

    #[test]
    fn test_entries_are_listed_in_order() {
        let names = list_entries();
        assert!(names.contains(&"c-major-scale"));
        assert!(names.contains(&"f-sharp-dominant-7th-chord"));
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }

    #[test]
    fn test_every_entry_is_a_valid_payload() {
        for entry in get_all_entries() {
            if let Err(e) = TheoryResult::from_json(&entry.content) {
                panic!("{} is not a valid payload: {}", entry.name, e);
            }
        }
    }

    #[test]
    fn test_get_entry() {
        let entry = get_entry("bb-major-chord").unwrap();
        let result = TheoryResult::from_json(&entry.content).unwrap();
        assert_eq!(result.root, "Bb");
        assert_eq!(result.notes, vec!["Bb", "D", "F"]);
        assert!(get_entry("missing").is_none());
    }
}
