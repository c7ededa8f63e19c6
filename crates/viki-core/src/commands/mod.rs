mod intents;
mod matcher;
mod registry;
mod store;
mod target;

pub use {
    intents::{BUILTIN_INTENTS, BuiltinIntent, IntentKind},
    matcher::{Resolution, resolve},
    registry::CommandRegistry,
    store::{CommandStore, TriggerPhrase, normalize},
    target::{ActionTarget, WEB_PREFIX},
};
