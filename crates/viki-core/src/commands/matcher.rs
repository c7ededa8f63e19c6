use crate::commands::{
    ActionTarget, BUILTIN_INTENTS, CommandStore, IntentKind, TriggerPhrase, normalize,
};

/// Outcome of resolving a query. Always produced, never an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A custom command matched.
    Custom {
        /// The stored trigger that matched.
        trigger: TriggerPhrase,
        /// Its target.
        target: ActionTarget,
    },
    /// A built-in intent matched.
    Builtin {
        /// Which behaviour fires.
        kind: IntentKind,
        /// The normalized query, needed by search-style intents.
        query: String,
    },
    /// Nothing matched. Dispatch is a silent no-op.
    NoMatch,
}

/// Resolve a query against the custom commands, then the built-in intents.
///
/// Custom triggers match on equality or as whole words inside the query,
/// first stored entry wins. Built-ins match on plain substring, first table
/// entry wins. Pure given `store`.
pub fn resolve(store: &CommandStore, query: &str) -> Resolution {
    let query = normalize(query);
    if query.is_empty() {
        return Resolution::NoMatch;
    }

    let padded_query = format!(" {} ", query);

    for (trigger, target) in store.iter() {
        let trigger_norm = trigger.normalized();
        if query == trigger_norm || padded_query.contains(&format!(" {} ", trigger_norm)) {
            return Resolution::Custom {
                trigger: trigger.clone(),
                target: target.clone(),
            };
        }
    }

    BUILTIN_INTENTS
        .iter()
        .find(|intent| intent.matches(&query))
        .map(|intent| Resolution::Builtin {
            kind: intent.kind,
            query: query.clone(),
        })
        .unwrap_or(Resolution::NoMatch)
}
