use indexmap::IndexMap;

/// A registered animation source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredAnimation {
    /// Base clip name; indices and suffixes are appended per loaded file.
    pub clip_name: String,
    /// Repeat count. `None` loads a single clip.
    pub count: Option<u32>,
}

/// Animation source path -> clip, in registration order. Lives for one
/// unit load.
#[derive(Debug, Clone, Default)]
pub struct AnimationRegistry {
    entries: IndexMap<String, RegisteredAnimation>,
}

impl AnimationRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    #[must_use]
    pub fn get(&self, path: &str) -> Option<&RegisteredAnimation> {
        self.entries.get(path)
    }

    /// Records `path`. Re-registering a path replaces its entry but keeps its
    /// original position.
    pub fn register(&mut self, path: &str, clip_name: impl Into<String>, count: Option<u32>) {
        self.entries.insert(
            path.to_string(),
            RegisteredAnimation {
                clip_name: clip_name.into(),
                count,
            },
        );
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RegisteredAnimation)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reregister_keeps_position() {
        let mut registry = AnimationRegistry::new();
        registry.register("a", "idle", None);
        registry.register("b", "attack", Some(2));
        registry.register("a", "idle", Some(3));

        let order: Vec<_> = registry.iter().map(|(path, _)| path).collect();
        assert_eq!(order, ["a", "b"]);
        assert_eq!(registry.get("a").unwrap().count, Some(3));
    }
}
