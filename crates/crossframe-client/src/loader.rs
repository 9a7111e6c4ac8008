//! On-demand loading of optional feature modules.

use crossframe_protocol::API_VERSION;

/// Loads a script by path and signals when it is ready.
pub trait ModuleLoader {
    /// Starts loading `path`, invoking `on_loaded` once available.
    fn load(&self, path: &str, on_loaded: Box<dyn FnOnce()>);
}

/// Optional feature modules that ship separately from the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolkitModule {
    /// Telephony integration.
    Cti,
    /// Live chat integration.
    Chat,
}

impl ToolkitModule {
    /// Short module name used in the script path.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Cti => "cti",
            Self::Chat => "chat",
        }
    }

    /// Versioned path the module is served from.
    pub fn script_path(&self) -> String {
        format!(
            "/support/console/{API_VERSION}/integration_{}.js",
            self.name()
        )
    }
}
