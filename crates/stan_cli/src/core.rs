//! Drives a machine core, executing its effects until none remain.

use std::fmt::Debug;

use anyhow::anyhow;
use crossbeam_channel::{unbounded, Sender};
use crux_core::{App, Core};
use stan_app::effects::session_storage::{SessionStorageOperation, SessionStorageResult};
use stan_app::effects::stan_core::{StanCoreOperation, StanCoreResult};
use stan_app::Effect;
use tracing::{debug, trace};

use crate::client::StanCoreClient;
use crate::session::{ClipboardProvider, SessionStore};

pub struct Shell<C, S, P> {
    client: C,
    session: S,
    clipboard: P,
}

impl<C: StanCoreClient, S: SessionStore, P: ClipboardProvider> Shell<C, S, P> {
    pub fn new(client: C, session: S, clipboard: P) -> Self {
        Self {
            client,
            session,
            clipboard,
        }
    }

    /// Run a single stan-core operation outside any machine, e.g. loading an admin list.
    pub async fn query(&self, operation: &StanCoreOperation) -> StanCoreResult {
        self.client.execute(operation).await
    }

    /// Process `event`, then every effect it causes, one at a time.
    pub async fn update<A>(&mut self, core: &Core<A>, event: A::Event) -> anyhow::Result<()>
    where
        A: App<Effect = Effect>,
        A::Event: Debug,
    {
        trace!("event: {:?}", event);

        let (tx, rx) = unbounded::<Effect>();
        enqueue(core.process_event(event), &tx)?;

        while let Ok(effect) = rx.try_recv() {
            trace!("effect: {:?}", effect);
            let effects = match effect {
                Effect::Render(_) => {
                    // The caller reads the view once the queue is drained.
                    continue;
                }
                Effect::StanCore(mut request) => {
                    let output = self
                        .client
                        .execute(&request.operation)
                        .await;
                    core.resolve(&mut request, output)
                }
                Effect::SessionStorage(mut request) => {
                    let value = match &request.operation {
                        SessionStorageOperation::Get {
                            key,
                        } => self.session.get(key)?,
                        SessionStorageOperation::Set {
                            key,
                            value,
                        } => {
                            self.session.set(key, value)?;
                            None
                        }
                        SessionStorageOperation::Remove {
                            key,
                        } => {
                            self.session.remove(key)?;
                            None
                        }
                    };
                    core.resolve(&mut request, SessionStorageResult {
                        value,
                    })
                }
                Effect::Clipboard(mut request) => {
                    let output = self.clipboard.read();
                    debug!("clipboard read. result: {:?}", output);
                    core.resolve(&mut request, output)
                }
            };

            enqueue(effects.map_err(|e| anyhow!("{:?}", e))?, &tx)?;
        }

        Ok(())
    }
}

fn enqueue(effects: Vec<Effect>, tx: &Sender<Effect>) -> anyhow::Result<()> {
    for effect in effects {
        tx.send(effect)
            .map_err(|e| anyhow!("{:?}", e))?;
    }
    Ok(())
}
