use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use std::path::PathBuf;

use log::{debug, warn};

use crate::plugin_system::dependency::DependencyError;
use crate::plugin_system::descriptor::{PluginDescriptor, PluginManifest};
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::traits::{Plugin, PluginCtor};
use crate::plugin_system::version::parse_version;

/// Manifest extensions recognized during the search-path scan.
#[cfg(feature = "yaml-config")]
const MANIFEST_EXTENSIONS: [&str; 3] = ["json", "yaml", "yml"];
#[cfg(not(feature = "yaml-config"))]
const MANIFEST_EXTENSIONS: [&str; 1] = ["json"];

/// Finds available plugins and resolves their dependency order.
///
/// Two discovery sources feed the descriptor map: statically registered
/// constructors, and manifest files found under the search paths whose
/// `entry` names a registered constructor. Each `discover` run rebuilds the
/// map from scratch.
pub struct PluginDiscovery {
    ctors: HashMap<String, PluginCtor>,
    descriptors: HashMap<String, PluginDescriptor>,
    search_paths: Vec<PathBuf>,
}

impl PluginDiscovery {
    pub fn new(search_paths: Vec<PathBuf>) -> Self {
        Self {
            ctors: HashMap::new(),
            descriptors: HashMap::new(),
            search_paths,
        }
    }

    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// Register a plugin constructor under a name (phase 1).
    ///
    /// Only the name and constructor are recorded here; version and
    /// dependency metadata come from the live instance on first
    /// instantiation (phase 2).
    pub fn register_static(
        &mut self,
        name: &str,
        ctor: PluginCtor,
    ) -> Result<(), PluginSystemError> {
        if self.ctors.contains_key(name) {
            return Err(PluginSystemError::RegistrationError {
                plugin: name.to_string(),
                message: "a constructor is already registered under this name".to_string(),
            });
        }
        self.ctors.insert(name.to_string(), ctor);
        Ok(())
    }

    /// Rebuild the descriptor map from all sources and return the sorted
    /// names of everything found.
    ///
    /// A single bad manifest never aborts the scan: malformed or unreadable
    /// files are logged and skipped, manifests naming an unregistered entry
    /// are skipped silently.
    pub fn discover(&mut self) -> Vec<String> {
        self.descriptors.clear();

        for (name, ctor) in &self.ctors {
            self.descriptors
                .insert(name.clone(), PluginDescriptor::placeholder(name, *ctor));
        }

        for dir in self.search_paths.clone() {
            if !dir.is_dir() {
                debug!("plugin search path not present: {}", dir.display());
                continue;
            }
            self.scan_directory(&dir);
        }

        let mut names: Vec<String> = self.descriptors.keys().cloned().collect();
        names.sort();
        debug!("discovered {} plugin(s)", names.len());
        names
    }

    fn scan_directory(&mut self, dir: &PathBuf) {
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("cannot scan plugin directory {}: {e}", dir.display());
                return;
            }
        };

        let mut paths: Vec<PathBuf> = entries.filter_map(|e| e.ok()).map(|e| e.path()).collect();
        paths.sort();

        for path in paths {
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if file_name.starts_with('_') {
                debug!("skipping underscore-prefixed file: {file_name}");
                continue;
            }
            let extension = path
                .extension()
                .and_then(|e| e.to_str())
                .map(str::to_lowercase);
            if !extension
                .as_deref()
                .is_some_and(|ext| MANIFEST_EXTENSIONS.contains(&ext))
            {
                continue;
            }
            self.load_manifest(&path);
        }
    }

    fn load_manifest(&mut self, path: &PathBuf) {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                warn!("cannot read plugin manifest {}: {e}", path.display());
                return;
            }
        };
        let manifest = match PluginManifest::from_str(&content, path) {
            Ok(manifest) => manifest,
            Err(e) => {
                warn!("skipping malformed plugin manifest: {e}");
                return;
            }
        };
        // Non-semver versions are allowed; constraint checks fall back to
        // string equality for them.
        if let Err(e) = parse_version(&manifest.version) {
            debug!("manifest {} version is not semver: {e}", path.display());
        }
        let Some(ctor) = self.ctors.get(&manifest.entry).copied() else {
            // unregistered entry: not an error, the implementation may simply
            // not be compiled in
            debug!(
                "manifest {} names unregistered entry '{}'",
                path.display(),
                manifest.entry
            );
            return;
        };
        if self.descriptors.contains_key(&manifest.name) {
            warn!(
                "duplicate plugin '{}' from manifest {}, keeping the earlier one",
                manifest.name,
                path.display()
            );
            return;
        }
        let descriptor = manifest.into_descriptor(path, ctor);
        self.descriptors.insert(descriptor.name.clone(), descriptor);
    }

    pub fn get_info(&self, name: &str) -> Option<&PluginDescriptor> {
        self.descriptors.get(name)
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.descriptors.keys().cloned().collect();
        names.sort();
        names
    }

    /// Construct a fresh instance of a discovered plugin and refresh its
    /// descriptor from the live metadata (phase 2).
    pub fn instantiate(&mut self, name: &str) -> Result<Box<dyn Plugin>, PluginSystemError> {
        let descriptor = self
            .descriptors
            .get(name)
            .ok_or_else(|| PluginSystemError::NotFound(name.to_string()))?;
        let instance = descriptor.instantiate();
        let refreshed = descriptor.refreshed_from(instance.as_ref());
        self.descriptors.insert(name.to_string(), refreshed);
        Ok(instance)
    }

    /// Compute the full dependency closure of the requested plugins and
    /// return it in a load order where every dependency precedes its
    /// dependents.
    ///
    /// Unknown names fail with `MissingPlugin`; a closure that cannot be
    /// fully ordered fails with `CyclicDependency` listing exactly the
    /// unresolved remainder.
    pub fn resolve_dependencies(&self, names: &[String]) -> Result<Vec<String>, DependencyError> {
        // fixed-point closure over the dependency relation
        let mut set: HashSet<String> = HashSet::new();
        let mut queue: VecDeque<String> = VecDeque::new();
        for name in names {
            if !self.descriptors.contains_key(name) {
                return Err(DependencyError::MissingPlugin {
                    name: name.clone(),
                    needed_by: None,
                });
            }
            if set.insert(name.clone()) {
                queue.push_back(name.clone());
            }
        }
        while let Some(current) = queue.pop_front() {
            let Some(descriptor) = self.descriptors.get(&current) else {
                continue;
            };
            for dep in &descriptor.dependencies {
                if !self.descriptors.contains_key(&dep.name) {
                    return Err(DependencyError::MissingPlugin {
                        name: dep.name.clone(),
                        needed_by: Some(current.clone()),
                    });
                }
                if set.insert(dep.name.clone()) {
                    queue.push_back(dep.name.clone());
                }
            }
        }

        // Kahn's algorithm over the closure
        let mut in_degree: HashMap<&str, usize> = HashMap::new();
        let mut dependents: HashMap<&str, Vec<&str>> = HashMap::new();
        for name in &set {
            let descriptor = &self.descriptors[name.as_str()];
            let deps_in_set = descriptor
                .dependencies
                .iter()
                .filter(|d| set.contains(&d.name))
                .count();
            in_degree.insert(name.as_str(), deps_in_set);
            for dep in &descriptor.dependencies {
                if set.contains(&dep.name) {
                    dependents
                        .entry(dep.name.as_str())
                        .or_default()
                        .push(name.as_str());
                }
            }
        }

        // BTreeSet keeps the order deterministic among unordered peers
        let mut ready: BTreeSet<&str> = in_degree
            .iter()
            .filter(|(_, degree)| **degree == 0)
            .map(|(name, _)| *name)
            .collect();
        let mut order: Vec<String> = Vec::with_capacity(set.len());
        while let Some(&next) = ready.iter().next() {
            ready.remove(next);
            order.push(next.to_string());
            for dependent in dependents.get(next).into_iter().flatten() {
                if let Some(degree) = in_degree.get_mut(dependent) {
                    *degree -= 1;
                    if *degree == 0 {
                        ready.insert(*dependent);
                    }
                }
            }
        }

        if order.len() < set.len() {
            let mut remaining: Vec<String> = set
                .iter()
                .filter(|name| !order.contains(*name))
                .cloned()
                .collect();
            remaining.sort();
            return Err(DependencyError::CyclicDependency(remaining));
        }
        Ok(order)
    }

    /// Check which of the requested plugins are present and claim framework
    /// compatibility. The framework-constraint half currently accepts every
    /// discovered plugin.
    pub fn check_compatibility(&self, names: &[String]) -> Vec<(String, bool)> {
        names
            .iter()
            .map(|name| (name.clone(), self.descriptors.contains_key(name)))
            .collect()
    }

    /// Drop all discovered descriptors. Registered constructors survive.
    pub fn clear_cache(&mut self) {
        self.descriptors.clear();
    }
}
