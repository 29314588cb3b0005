use crux_core::{Command, Request};

use crate::effects::clipboard::ClipboardOperation;
use crate::effects::session_storage::SessionStorageOperation;
use crate::effects::stan_core::StanCoreOperation;
use crate::Effect;

/// Effects produced by a command, split by kind.
#[derive(Default)]
pub struct Effects {
    pub renders: usize,
    pub stan_core: Vec<Request<StanCoreOperation>>,
    pub session_storage: Vec<Request<SessionStorageOperation>>,
    pub clipboard: Vec<Request<ClipboardOperation>>,
}

pub fn effects<Event: Send + 'static>(command: &mut Command<Effect, Event>) -> Effects {
    let mut effects = Effects::default();
    for effect in command.effects() {
        match effect {
            Effect::Render(_) => effects.renders += 1,
            Effect::StanCore(request) => effects.stan_core.push(request),
            Effect::SessionStorage(request) => effects.session_storage.push(request),
            Effect::Clipboard(request) => effects.clipboard.push(request),
        }
    }
    effects
}

pub fn events<Effect: Send + 'static, Event: Send + 'static>(command: &mut Command<Effect, Event>) -> Vec<Event> {
    command.events().collect()
}
