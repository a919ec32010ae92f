//! Reflective-metadata cache: extracted directives and field lookups.

use std::sync::Arc;
use std::time::Duration;

use dictrans_core::config::ReflectionCacheConfig;
use dictrans_core::constants::CACHE_KEY_SEPARATOR;
use dictrans_core::models::{CacheStatistics, FieldWarning};
use dictrans_core::traits::IEvictable;
use dictrans_core::TranslationDirective;
use dictrans_observability::events;

use crate::CacheManager;

pub const REFLECTION_CACHE_NAME: &str = "reflection";

/// Directives extracted from one type's schema.
#[derive(Debug, Clone, Default)]
pub struct TypeDirectives {
    /// `(source field index in the schema, directive)` in declaration order.
    pub entries: Vec<(usize, Arc<TranslationDirective>)>,
    /// Fields skipped during extraction.
    pub warnings: Vec<FieldWarning>,
}

impl TypeDirectives {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Cheap-to-rebuild metadata. Keys are `<type>` for directive lists and
/// `<type>#<field>` for field lookups.
pub struct ReflectionCache {
    directives: CacheManager<Arc<TypeDirectives>>,
    fields: CacheManager<Option<usize>>,
}

impl ReflectionCache {
    pub fn new(config: &ReflectionCacheConfig) -> Self {
        let idle = (config.expire_after_access_secs > 0)
            .then(|| Duration::from_secs(config.expire_after_access_secs));
        let max = config.max_size as usize;
        Self {
            directives: CacheManager::new("reflection.directives", max, idle),
            fields: CacheManager::new("reflection.fields", max, idle),
        }
    }

    pub fn field_key(type_name: &str, field: &str) -> String {
        format!("{type_name}{CACHE_KEY_SEPARATOR}{field}")
    }

    /// Directives for `type_name`, extracted by `build` on a miss.
    pub fn directives_for<F>(&self, type_name: &str, build: F) -> Arc<TypeDirectives>
    where
        F: FnOnce() -> TypeDirectives,
    {
        let result: Result<_, std::convert::Infallible> =
            self.directives.get_or_try_insert_with(type_name, || {
                let directives = build();
                let weight = directives.entries.len().max(1);
                Ok((Arc::new(directives), weight))
            });
        match result {
            Ok(directives) => directives,
            Err(never) => match never {},
        }
    }

    /// Index of `field` in the schema of `type_name`, resolved by `resolve`
    /// on a miss. Absent fields are cached too.
    pub fn field_index<F>(&self, type_name: &str, field: &str, resolve: F) -> Option<usize>
    where
        F: FnOnce() -> Option<usize>,
    {
        let key = Self::field_key(type_name, field);
        if let Some(index) = self.fields.get(&key) {
            return index;
        }
        let index = resolve();
        self.fields.put(key, index);
        index
    }

    /// Drop every entry derived from `type_name`.
    pub fn invalidate_type(&self, type_name: &str) -> usize {
        let own = usize::from(self.directives.remove(type_name).is_some());
        let prefix = format!("{type_name}{CACHE_KEY_SEPARATOR}");
        own + self.fields.invalidate_prefix(&prefix)
    }
}

impl IEvictable for ReflectionCache {
    fn name(&self) -> &str {
        REFLECTION_CACHE_NAME
    }

    fn evict_least_recently_used(&self, count: usize) -> usize {
        let from_fields = self.fields.evict_least_recently_used(count);
        let removed =
            from_fields + self.directives.evict_least_recently_used(count - from_fields);
        events::cache_cleared(REFLECTION_CACHE_NAME, removed, "lru");
        removed
    }

    fn evict_all(&self) -> usize {
        let removed = self.directives.evict_all() + self.fields.evict_all();
        events::cache_cleared(REFLECTION_CACHE_NAME, removed, "evict_all");
        removed
    }

    fn statistics(&self) -> CacheStatistics {
        CacheStatistics::combine(
            REFLECTION_CACHE_NAME,
            &[self.directives.statistics(), self.fields.statistics()],
        )
    }

    fn size(&self) -> usize {
        self.directives.len() + self.fields.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dictrans_core::DirectiveKind;

    fn cache() -> ReflectionCache {
        ReflectionCache::new(&ReflectionCacheConfig::default())
    }

    fn directive(field: &str) -> Arc<TranslationDirective> {
        Arc::new(TranslationDirective {
            source_field: field.to_string(),
            target_field: field.to_string(),
            delimiter: ",".to_string(),
            ignore_original: false,
            kind: DirectiveKind::SystemDict {
                dict_code: "d".to_string(),
            },
        })
    }

    #[test]
    fn directives_are_extracted_once() {
        let c = cache();
        let first = c.directives_for("User", || TypeDirectives {
            entries: vec![(0, directive("status"))],
            warnings: Vec::new(),
        });
        let second = c.directives_for("User", || panic!("must not re-extract"));
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn missing_fields_are_cached() {
        let c = cache();
        assert_eq!(c.field_index("User", "nope", || None), None);
        assert_eq!(c.field_index("User", "nope", || Some(3)), None);
        assert_eq!(c.field_index("User", "name", || Some(1)), Some(1));
    }

    #[test]
    fn invalidate_type_leaves_other_types() {
        let c = cache();
        c.directives_for("User", TypeDirectives::default);
        c.directives_for("UserProfile", TypeDirectives::default);
        c.field_index("User", "a", || Some(0));
        c.field_index("User", "b", || Some(1));
        c.field_index("UserProfile", "a", || Some(0));

        assert_eq!(c.invalidate_type("User"), 3);
        assert_eq!(c.size(), 2);
        assert_eq!(c.field_index("User", "a", || Some(5)), Some(5));
    }

    #[test]
    fn statistics_combine_both_tables() {
        let c = cache();
        c.directives_for("User", TypeDirectives::default);
        c.field_index("User", "a", || Some(0));
        c.field_index("User", "a", || Some(0));
        let stats = c.statistics();
        assert_eq!(stats.name, REFLECTION_CACHE_NAME);
        assert_eq!(stats.size, 2);
        assert_eq!(stats.hit_count, 1);
        assert_eq!(stats.max_size, 1_000);
        assert_eq!(c.evict_all(), 2);
        assert_eq!(c.size(), 0);
    }
}
