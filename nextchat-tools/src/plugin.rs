//! Plugins: named bundles of tools a conversation can opt into.

use indexmap::IndexMap;
use tracing::warn;

use crate::registry::ToolRegistry;

/// A named bundle of tools.
#[derive(Debug, Clone)]
pub struct Plugin {
    /// Stable plugin id, referenced by a conversation's plugin selection.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Tools provided by the plugin.
    pub tools: ToolRegistry,
}

impl Plugin {
    /// Create a plugin with no tools.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            tools: ToolRegistry::new(),
        }
    }

    /// Set the plugin's tools.
    #[must_use]
    pub fn with_tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }
}

/// All installed plugins, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct PluginStore {
    plugins: IndexMap<String, Plugin>,
}

impl PluginStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a plugin, replacing one with the same id.
    pub fn add(&mut self, plugin: Plugin) -> &mut Self {
        self.plugins.insert(plugin.id.clone(), plugin);
        self
    }

    /// Remove a plugin.
    pub fn remove(&mut self, id: &str) -> Option<Plugin> {
        self.plugins.shift_remove(id)
    }

    /// Look up a plugin.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Plugin> {
        self.plugins.get(id)
    }

    /// Installed plugin ids.
    #[must_use]
    pub fn ids(&self) -> Vec<&str> {
        self.plugins.keys().map(String::as_str).collect()
    }

    /// Merge the tools of the selected plugins into one registry.
    ///
    /// Plugins are merged in selection order; a later plugin's tool wins a
    /// name clash. Unknown ids are skipped.
    #[must_use]
    pub fn as_tools<S: AsRef<str>>(&self, selection: &[S]) -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        for id in selection {
            match self.plugins.get(id.as_ref()) {
                Some(plugin) => registry.merge(&plugin.tools),
                None => warn!(plugin_id = id.as_ref(), "Selected plugin is not installed"),
            }
        }
        registry
    }
}
