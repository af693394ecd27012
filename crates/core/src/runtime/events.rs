use crate::runtime::{EventHandler, Unsubscribe};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};

struct Listener {
    id: u64,
    remaining: Option<u32>,
    handler: EventHandler,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: HashMap<String, Vec<Listener>>,
}

/// In-process event registry with bounded-count subscriptions.
#[derive(Clone, Default)]
pub struct EventBus {
    inner: Arc<Mutex<Registry>>,
}

fn lock(registry: &Mutex<Registry>) -> std::sync::MutexGuard<'_, Registry> {
    registry.lock().unwrap_or_else(|e| e.into_inner())
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_multiple(&self, event: &str, handler: EventHandler, max_count: i32) -> Unsubscribe {
        let remaining = u32::try_from(max_count).ok().filter(|n| *n > 0);
        let id = {
            let mut reg = lock(&self.inner);
            reg.next_id += 1;
            let id = reg.next_id;
            reg.listeners
                .entry(event.to_string())
                .or_default()
                .push(Listener {
                    id,
                    remaining,
                    handler,
                });
            id
        };

        let registry: Weak<Mutex<Registry>> = Arc::downgrade(&self.inner);
        let event = event.to_string();
        Unsubscribe::new(move || {
            if let Some(registry) = registry.upgrade() {
                remove(&mut lock(&registry), &event, id);
            }
        })
    }

    pub fn off(&self, event: &str) {
        lock(&self.inner).listeners.remove(event);
    }

    /// Delivers `args` to every listener of `event` and returns how many
    /// were called. Handlers run outside the registry lock.
    pub fn emit(&self, event: &str, args: &[Value]) -> usize {
        let handlers: Vec<EventHandler> = {
            let mut reg = lock(&self.inner);
            let Some(listeners) = reg.listeners.get_mut(event) else {
                return 0;
            };
            let handlers = listeners.iter().map(|l| l.handler.clone()).collect();
            for listener in listeners.iter_mut() {
                if let Some(n) = listener.remaining.as_mut() {
                    *n -= 1;
                }
            }
            listeners.retain(|l| l.remaining != Some(0));
            if listeners.is_empty() {
                reg.listeners.remove(event);
            }
            handlers
        };

        for handler in &handlers {
            handler(args);
        }
        handlers.len()
    }

    pub fn listener_count(&self, event: &str) -> usize {
        lock(&self.inner)
            .listeners
            .get(event)
            .map_or(0, Vec::len)
    }
}

fn remove(reg: &mut Registry, event: &str, id: u64) {
    if let Some(listeners) = reg.listeners.get_mut(event) {
        listeners.retain(|l| l.id != id);
        if listeners.is_empty() {
            reg.listeners.remove(event);
        }
    }
}
