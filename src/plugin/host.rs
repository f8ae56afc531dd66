use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard, RwLock};

use crate::calendar::http::HttpCapability;
use crate::config::CalendarSettings;
use crate::error::HostError;

/// Supplies the input string for the current call.
pub type InputProvider = Arc<dyn Fn() -> Result<String, HostError> + Send + Sync>;

/// Receives the output string for the current call.
pub type OutputSink = Arc<dyn Fn(&str) + Send + Sync>;

/// The ambient input/output pair. Whoever holds these is "the caller" as far
/// as a handler can tell.
#[derive(Clone)]
pub struct Bindings {
    pub input: InputProvider,
    pub output: OutputSink,
}

impl Bindings {
    /// No input, discarded output.
    pub fn detached() -> Self {
        Self {
            input: Arc::new(|| Err(HostError::NoInput)),
            output: Arc::new(|_: &str| {}),
        }
    }
}

/// Process-wide plugin runtime: the ambient channel plus the HTTP and config
/// capabilities handlers are allowed to use.
pub struct PluginHost {
    bindings: RwLock<Bindings>,
    window: Mutex<()>,
    http: Arc<dyn HttpCapability>,
    config: HashMap<String, String>,
    settings: CalendarSettings,
}

impl PluginHost {
    pub fn new(
        http: Arc<dyn HttpCapability>,
        config: HashMap<String, String>,
        settings: CalendarSettings,
    ) -> Self {
        Self {
            bindings: RwLock::new(Bindings::detached()),
            window: Mutex::new(()),
            http,
            config,
            settings,
        }
    }

    /// Bind the top-level input and output, i.e. the real caller.
    pub fn with_bindings(self, bindings: Bindings) -> Self {
        *self.bindings.write() = bindings;
        self
    }

    /// Read the input of the current call.
    pub fn input_string(&self) -> Result<String, HostError> {
        // Clone the provider out so the lock isn't held while it runs.
        let input = Arc::clone(&self.bindings.read().input);
        input()
    }

    /// Write the output of the current call.
    pub fn output_string(&self, content: &str) {
        let output = Arc::clone(&self.bindings.read().output);
        output(content);
    }

    pub fn http(&self) -> &dyn HttpCapability {
        self.http.as_ref()
    }

    /// Plugin config lookup, resolved once at startup.
    pub fn config_get(&self, key: &str) -> Option<&str> {
        self.config.get(key).map(String::as_str)
    }

    pub fn settings(&self) -> &CalendarSettings {
        &self.settings
    }

    /// Replace the ambient bindings, returning the ones that were installed.
    /// Only the channel shim calls this, while holding the window.
    pub(crate) fn swap_bindings(&self, bindings: Bindings) -> Bindings {
        std::mem::replace(&mut *self.bindings.write(), bindings)
    }

    /// Exclusive ownership of the ambient channel for one install/restore window.
    pub(crate) fn lock_window(&self) -> MutexGuard<'_, ()> {
        self.window.lock()
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use crate::calendar::http::stub::StubHttp;

    /// Captures everything written to a host's output.
    #[derive(Clone, Default)]
    pub struct Recorder(pub Arc<Mutex<Vec<String>>>);

    impl Recorder {
        pub fn sink(&self) -> OutputSink {
            let writes = Arc::clone(&self.0);
            Arc::new(move |s: &str| writes.lock().push(s.to_string()))
        }

        pub fn writes(&self) -> Vec<String> {
            self.0.lock().clone()
        }
    }

    pub fn fixed_input(text: &str) -> InputProvider {
        let text = text.to_string();
        Arc::new(move || Ok(text.clone()))
    }

    pub fn host_with(stub: Arc<StubHttp>, settings: CalendarSettings) -> PluginHost {
        let mut config = HashMap::new();
        config.insert(settings.credential_key.clone(), "config-token".to_string());
        PluginHost::new(stub, config, settings)
    }
}

#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use crate::calendar::http::stub::StubHttp;

    #[test]
    fn test_detached_host_has_no_input() {
        let host = PluginHost::new(
            Arc::new(StubHttp::new()),
            HashMap::new(),
            CalendarSettings::default(),
        );
        assert!(matches!(host.input_string(), Err(HostError::NoInput)));
        // Writing with nothing bound is a no-op.
        host.output_string("dropped");
    }

    #[test]
    fn test_bindings_route_input_and_output() {
        let recorder = Recorder::default();
        let host = PluginHost::new(
            Arc::new(StubHttp::new()),
            HashMap::new(),
            CalendarSettings::default(),
        )
        .with_bindings(Bindings {
            input: fixed_input("hello"),
            output: recorder.sink(),
        });

        assert_eq!(host.input_string().unwrap(), "hello");
        host.output_string("one");
        host.output_string("two");
        assert_eq!(recorder.writes(), vec!["one", "two"]);
    }

    #[test]
    fn test_swap_returns_previous_bindings() {
        let host = PluginHost::new(
            Arc::new(StubHttp::new()),
            HashMap::new(),
            CalendarSettings::default(),
        )
        .with_bindings(Bindings {
            input: fixed_input("outer"),
            output: Arc::new(|_: &str| {}),
        });

        let prior = host.swap_bindings(Bindings {
            input: fixed_input("inner"),
            output: Arc::new(|_: &str| {}),
        });
        assert_eq!(host.input_string().unwrap(), "inner");
        assert_eq!((prior.input)().unwrap(), "outer");
    }

    #[test]
    fn test_config_lookup() {
        let host = host_with(Arc::new(StubHttp::new()), CalendarSettings::default());
        assert_eq!(host.config_get("GOOGLE_ACCESS_TOKEN"), Some("config-token"));
        assert_eq!(host.config_get("OTHER"), None);
    }
}
