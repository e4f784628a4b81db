//! Tracing setup for harness runs.

use std::{collections::HashSet, fmt::Display};

use tracing_subscriber::{
    Layer, Registry, filter::Targets, layer::SubscriberExt, reload::Handle,
    util::SubscriberInitExt,
};

/// Type of event to trace.
#[derive(Clone, Debug, Eq, Hash, PartialEq, clap::ValueEnum)]
pub enum TraceEvent {
    /// Traces suite discovery and loading.
    #[clap(name = "discovery")]
    Discovery,
    /// Traces validator runs and their classification.
    #[clap(name = "execution")]
    Execution,
    /// Traces result hook invocations.
    #[clap(name = "hooks")]
    Hooks,
}

impl Display for TraceEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Discovery => write!(f, "discovery"),
            Self::Execution => write!(f, "execution"),
            Self::Hooks => write!(f, "hooks"),
        }
    }
}

/// Installs a stderr subscriber whose per-category filter can be changed at runtime.
#[derive(Default)]
pub struct TraceEventConfig {
    enabled_trace_events: HashSet<TraceEvent>,
    handle: Option<Handle<Targets, Registry>>,
}

impl TraceEventConfig {
    /// Installs the global subscriber with the given events enabled. If a global
    /// subscriber is already installed, a warning is printed and the returned
    /// config cannot change the filter.
    pub fn init(enabled_trace_events: &[TraceEvent]) -> Self {
        let enabled_trace_events: HashSet<TraceEvent> =
            enabled_trace_events.iter().cloned().collect();

        let mut config = Self {
            enabled_trace_events,
            ..Default::default()
        };

        let filter = config.compose_filter();

        let (reload_filter, handle) = tracing_subscriber::reload::Layer::new(filter);

        let layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .without_time()
            .with_filter(reload_filter);

        if tracing_subscriber::registry()
            .with(layer)
            .try_init()
            .is_ok()
        {
            config.handle = Some(handle);
        } else {
            eprintln!("warning: failed to initialize tracing.");
        }

        config
    }

    fn compose_filter(&self) -> Targets {
        let mut filter =
            Targets::new().with_default(tracing_subscriber::filter::LevelFilter::INFO);

        for event in &self.enabled_trace_events {
            let target = match event {
                TraceEvent::Discovery => "discovery",
                TraceEvent::Execution => "execution",
                TraceEvent::Hooks => "hooks",
            };

            filter = filter.with_target(target, tracing::Level::TRACE);
        }

        filter
    }

    /// Returns the enabled events.
    pub const fn enabled_events(&self) -> &HashSet<TraceEvent> {
        &self.enabled_trace_events
    }

    /// Enables tracing of `event`.
    pub fn enable(&mut self, event: &TraceEvent) -> anyhow::Result<()> {
        // Don't bother to reload config if nothing has changed.
        if !self.enabled_trace_events.insert(event.to_owned()) {
            return Ok(());
        }

        self.reload_filter()
    }

    /// Disables tracing of `event`.
    pub fn disable(&mut self, event: &TraceEvent) -> anyhow::Result<()> {
        // Don't bother to reload config if nothing has changed.
        if !self.enabled_trace_events.remove(event) {
            return Ok(());
        }

        self.reload_filter()
    }

    fn reload_filter(&self) -> anyhow::Result<()> {
        let Some(handle) = &self.handle else {
            anyhow::bail!("tracing not initialized");
        };

        handle
            .reload(self.compose_filter())
            .map_err(|e| anyhow::anyhow!("failed to update tracing filter: {e}"))
    }
}
