//! Shared fixtures for the integration tests.
//!
//! [`install`] sets up a logger that forwards to `env_logger` (so
//! `RUST_LOG` still controls what reaches stderr) and records every event
//! in a per-thread buffer. Each test runs on its own thread, so
//! [`take_logs`] only sees what the calling test emitted.

#![allow(dead_code)]

use std::cell::RefCell;
use std::sync::Once;

use ecs_persist::{Component, ComponentRegistry, ComponentSerializer};
use log::Log;

/// A single captured log entry.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub level: log::Level,
    pub message: String,
}

thread_local! {
    static CAPTURED: RefCell<Vec<LogEntry>> = const { RefCell::new(Vec::new()) };
}

/// Logger that wraps `env_logger` and captures entries per thread.
struct LogCapture {
    inner: env_logger::Logger,
}

impl Log for LogCapture {
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        if self.inner.enabled(record.metadata()) {
            self.inner.log(record);
        }
        let entry = LogEntry {
            level: record.level(),
            message: format!("{}", record.args()),
        };
        CAPTURED.with(|captured| captured.borrow_mut().push(entry));
    }

    fn flush(&self) {
        self.inner.flush();
    }
}

/// Install the capturing logger once per test binary and clear this
/// thread's buffer.
pub fn install() {
    static INSTALL: Once = Once::new();
    INSTALL.call_once(|| {
        let inner =
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("off"))
                .build();
        log::set_boxed_logger(Box::new(LogCapture { inner })).expect("logger already set");
        log::set_max_level(log::LevelFilter::Trace);
    });
    CAPTURED.with(|captured| captured.borrow_mut().clear());
}

/// Drain the events captured on this thread.
pub fn take_logs() -> Vec<LogEntry> {
    CAPTURED.with(|captured| std::mem::take(&mut *captured.borrow_mut()))
}

/// Number of captured events at exactly `level`, draining the buffer.
pub fn count_logs(level: log::Level) -> usize {
    take_logs().iter().filter(|e| e.level == level).count()
}

/// Number of captured warnings and errors, draining the buffer.
pub fn count_problems() -> usize {
    take_logs()
        .iter()
        .filter(|e| e.level <= log::Level::Warn)
        .count()
}

// ---------------------------------------------------------------------------
// Components
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Component)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Component)]
pub struct Health {
    pub hp: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Component)]
pub struct CharacterComponent {
    pub name: Option<String>,
    pub level: u32,
    pub inventory: Vec<String>,
    #[field(tag = "server_only")]
    pub secret: Option<u64>,
}

/// Registry holding [`Position`], [`Health`] and [`CharacterComponent`].
pub fn registry() -> ComponentRegistry {
    let mut registry = ComponentRegistry::new();
    registry.register::<Position>().unwrap();
    registry.register::<Health>().unwrap();
    registry.register::<CharacterComponent>().unwrap();
    registry
}

pub fn serializer() -> ComponentSerializer {
    ComponentSerializer::new(registry())
}
