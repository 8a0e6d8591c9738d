use crate::core::{
    pattern::{PatternError, compile},
    resource::{Resource, ResourceDefinition, ResourceId},
    search_index::SearchIndex,
};

/// Owner of every registered resource.
///
/// Ids are vector positions, so lookups are O(1) and stay valid for the
/// table's lifetime.
#[derive(Debug, Default)]
pub struct ResourceTable {
    resources: Vec<Resource>,
}

impl ResourceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile `definition`'s templates, assign the next id and file every
    /// pattern in `index`.
    ///
    /// Nothing is inserted if any template fails to compile.
    pub fn register(
        &mut self,
        definition: ResourceDefinition,
        index: &mut SearchIndex,
    ) -> Result<ResourceId, PatternError> {
        let (name, uris, handlers) = definition.into_parts();
        let patterns = uris
            .iter()
            .map(|uri| compile(uri))
            .collect::<Result<Vec<_>, _>>()?;

        let id = ResourceId::new(self.resources.len());
        if patterns.is_empty() {
            tracing::warn!(resource = %name, %id, "Resource declares no URIs and can never match");
        }
        for pattern in &patterns {
            index.insert(pattern, id);
            tracing::debug!(
                resource = %name,
                %id,
                template = pattern.raw_template(),
                term = pattern.search_term(),
                "Indexed route pattern"
            );
        }

        self.resources.push(Resource::new(id, name, patterns, handlers));
        Ok(id)
    }

    pub fn get(&self, id: ResourceId) -> Option<&Resource> {
        self.resources.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Resource> {
        self.resources.iter()
    }
}
