use std::{
    fmt::Debug,
    panic::{self, AssertUnwindSafe},
    sync::{Arc, Mutex, PoisonError, TryLockError},
    thread,
    time::Duration,
};

use itertools::Itertools;
use regex::Regex;
use strategies::{GenericStrategy, InputStrategy, RandomStrategy};
use types::{DisposeError, PluginInfo, PluginKind, StrategyPlugin, SDK_VERSION};

use crate::{
    error::{BotError, PluginNotValidReason},
    guard::GuardedStrategy,
};

/// A loaded strategy, shared between the registry and whoever dispatches
/// decisions to it.
pub type SharedStrategy = Arc<Mutex<Box<dyn StrategyPlugin>>>;

pub type StrategyFactory = Box<dyn Fn() -> Box<dyn StrategyPlugin> + Send + Sync>;

struct LoadedPlugin {
    info: PluginInfo,
    instance: SharedStrategy,
}

struct PluginHolder {
    id: String,
    factory: StrategyFactory,
    loaded: Option<LoadedPlugin>,
}

impl PluginHolder {
    fn instantiate(&self) -> Result<Box<dyn StrategyPlugin>, BotError> {
        panic::catch_unwind(AssertUnwindSafe(|| (self.factory)())).map_err(|_| {
            BotError::PluginNotValid {
                id: self.id.clone(),
                reason: PluginNotValidReason::CanNotCreateInstance,
            }
        })
    }

    /// Disposes the instance if there is one. The instance is dropped either
    /// way, so a plugin never sees `dispose` twice.
    ///
    /// An instance still locked by a decision that outlived its budget is
    /// handed to a background thread which disposes it once the decision
    /// returns; the caller gets [`BotError::Busy`] right away.
    fn unload(&mut self) -> Result<(), BotError> {
        let Some(loaded) = self.loaded.take() else {
            return Ok(());
        };
        log::info!("Unloading plugin '{}' ({})", self.id, loaded.info.name);
        let mut instance = match loaded.instance.try_lock() {
            Ok(instance) => instance,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => {
                dispose_when_idle(self.id.clone(), Arc::clone(&loaded.instance));
                return Err(BotError::Busy(self.id.clone()));
            }
        };
        dispose_plugin(&self.id, &mut instance)
    }
}

fn dispose_plugin(id: &str, plugin: &mut Box<dyn StrategyPlugin>) -> Result<(), BotError> {
    let released = panic::catch_unwind(AssertUnwindSafe(|| plugin.dispose()))
        .unwrap_or_else(|_| Err(DisposeError("panicked while releasing resources".to_string())));
    released.map_err(|source| BotError::Dispose {
        id: id.to_string(),
        source,
    })
}

fn dispose_when_idle(id: String, instance: SharedStrategy) {
    log::warn!("Plugin '{id}' is still deciding, it will be disposed once it returns");
    thread::spawn(move || {
        let mut plugin = instance.lock().unwrap_or_else(PoisonError::into_inner);
        match dispose_plugin(&id, &mut plugin) {
            Ok(()) => log::info!("Plugin '{id}' disposed after its last decision"),
            Err(err) => log::error!("{err}"),
        }
    });
}

/// Owns every known strategy plugin, from registration through load to
/// unload.
#[derive(Default)]
pub struct PluginRegistry {
    plugins: Vec<PluginHolder>,
}

impl Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("plugins", &self.ids())
            .field("loaded", &self.loaded_ids())
            .finish()
    }
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builtin_strategies() -> Self {
        let mut registry = Self::new();
        registry.register("Generic", || Box::new(GenericStrategy::default()));
        registry.register("Random", || Box::new(RandomStrategy::default()));
        registry.register("Input", || Box::new(InputStrategy::default()));
        registry
    }

    /// Registers a factory under `id`. A plugin already registered under the
    /// same id is unloaded and replaced.
    pub fn register<F>(&mut self, id: &str, factory: F) -> Option<BotError>
    where
        F: Fn() -> Box<dyn StrategyPlugin> + Send + Sync + 'static,
    {
        let mut fault = None;
        if let Some(idx) = self.position(id) {
            let mut old = self.plugins.remove(idx);
            fault = old.unload().err();
            if let Some(err) = &fault {
                log::error!("{err}");
            }
        }
        self.plugins.push(PluginHolder {
            id: id.to_string(),
            factory: Box::new(factory),
            loaded: None,
        });
        fault
    }

    pub fn ids(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.id.as_str()).collect()
    }

    pub fn loaded_ids(&self) -> Vec<&str> {
        self.plugins
            .iter()
            .filter(|p| p.loaded.is_some())
            .map(|p| p.id.as_str())
            .collect()
    }

    /// Instantiates and validates the plugin registered under `id`.
    pub fn load(&mut self, id: &str) -> Result<PluginInfo, BotError> {
        let idx = self
            .position(id)
            .ok_or_else(|| BotError::PluginNotFound(id.to_string()))?;
        let holder = &mut self.plugins[idx];
        if holder.loaded.is_some() {
            return Err(BotError::AlreadyLoaded(holder.id.clone()));
        }

        let mut instance = holder.instantiate()?;
        let described = panic::catch_unwind(AssertUnwindSafe(|| {
            (instance.plugin_information(), instance.sdk_version())
        }));
        let checked = match described {
            Ok((info, sdk_version)) => validate(&info, sdk_version).map(|()| info),
            Err(_) => Err(PluginNotValidReason::CanNotCreateInstance),
        };
        let info = match checked {
            Ok(info) => info,
            Err(reason) => {
                if let Err(err) = dispose_plugin(&holder.id, &mut instance) {
                    log::error!("{err}");
                }
                return Err(BotError::PluginNotValid {
                    id: holder.id.clone(),
                    reason,
                });
            }
        };

        log::info!(
            "Loaded plugin '{}': {} v{} ({})",
            holder.id,
            info.name,
            info.version,
            info.kind
        );
        holder.loaded = Some(LoadedPlugin {
            info: info.clone(),
            instance: Arc::new(Mutex::new(instance)),
        });
        Ok(info)
    }

    /// Loads every registered plugin that is not loaded yet. Failures are
    /// logged and returned; they do not stop the other plugins loading.
    pub fn load_all(&mut self) -> Vec<BotError> {
        let pending = self
            .plugins
            .iter()
            .filter(|p| p.loaded.is_none())
            .map(|p| p.id.clone())
            .collect_vec();
        pending
            .iter()
            .filter_map(|id| self.load(id).err())
            .inspect(|err| log::error!("{err}"))
            .collect()
    }

    pub fn info(&self, id: &str) -> Option<&PluginInfo> {
        self.get(id)
            .and_then(|p| p.loaded.as_ref())
            .map(|loaded| &loaded.info)
    }

    pub fn infos_by_kind(&self, kind: PluginKind) -> Vec<&PluginInfo> {
        self.plugins
            .iter()
            .filter_map(|p| p.loaded.as_ref())
            .map(|loaded| &loaded.info)
            .filter(|info| info.kind == kind)
            .collect()
    }

    /// The loaded instance registered under `id`, matched case-insensitively.
    pub fn strategy(&self, id: &str) -> Result<SharedStrategy, BotError> {
        self.get(id)
            .and_then(|p| p.loaded.as_ref())
            .map(|loaded| Arc::clone(&loaded.instance))
            .ok_or_else(|| BotError::PluginNotFound(id.to_string()))
    }

    /// A guard around the loaded instance under `id`, named from the info
    /// recorded at load time.
    pub fn guarded(&self, id: &str, budget: Duration) -> Result<GuardedStrategy, BotError> {
        let loaded = self
            .get(id)
            .and_then(|p| p.loaded.as_ref())
            .ok_or_else(|| BotError::PluginNotFound(id.to_string()))?;
        Ok(GuardedStrategy::new(
            loaded.info.name.clone(),
            Arc::clone(&loaded.instance),
            budget,
        ))
    }

    pub fn unload(&mut self, id: &str) -> Result<(), BotError> {
        let idx = self
            .position(id)
            .ok_or_else(|| BotError::PluginNotFound(id.to_string()))?;
        self.plugins[idx].unload()
    }

    /// Unloads every plugin. A faulting plugin does not stop the rest; all
    /// faults are logged and returned.
    pub fn unload_all(&mut self) -> Vec<BotError> {
        self.plugins
            .iter_mut()
            .filter_map(|p| p.unload().err())
            .inspect(|err| log::error!("{err}"))
            .collect()
    }

    fn get(&self, id: &str) -> Option<&PluginHolder> {
        self.position(id).map(|idx| &self.plugins[idx])
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.plugins
            .iter()
            .position(|p| p.id.eq_ignore_ascii_case(id))
    }
}

impl Drop for PluginRegistry {
    fn drop(&mut self) {
        self.unload_all();
    }
}

fn validate(info: &PluginInfo, sdk_version: u32) -> Result<(), PluginNotValidReason> {
    if info.kind != PluginKind::Strategy {
        return Err(PluginNotValidReason::UnknownPluginType);
    }
    if info.name.trim().is_empty() {
        return Err(PluginNotValidReason::InfoNotFound);
    }
    if let Some(link) = &info.source_code_link {
        if !is_absolute_uri(link) {
            return Err(PluginNotValidReason::InvalidInfoSourceCodeLink);
        }
    }
    if sdk_version < SDK_VERSION {
        return Err(PluginNotValidReason::OutdatedSdk {
            found: sdk_version,
            expected: SDK_VERSION,
        });
    }
    if sdk_version > SDK_VERSION {
        return Err(PluginNotValidReason::UnsupportedSdk {
            found: sdk_version,
            expected: SDK_VERSION,
        });
    }
    Ok(())
}

fn is_absolute_uri(link: &str) -> bool {
    let re = Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*://[^\s/?#]+[^\s]*$")
        .expect("Valid source link regex");
    re.is_match(link)
}
