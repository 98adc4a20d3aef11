//! Startup asset sequence.
//!
//! The environment is awaited and installed before the model load is even
//! started, so the model is lit correctly from the first frame it appears in.
//! The two fetches are serialised on purpose.
//!
//! Failure policy: a failed environment is not fatal. The error is logged once,
//! the scene stays in [`Stage::EnvironmentLoading`] and keeps rendering the clear
//! colour, and the model is never requested. A failed model is logged once and
//! the scene becomes [`Stage::Ready`] without one.

use crate::{
    config::AssetPaths,
    data_structures::scene_graph::{SceneSink, Stage},
};

/// Asynchronous source of the two startup assets.
pub trait AssetLoader {
    type Environment;
    type Model;

    fn load_environment(
        &self,
        url: &str,
    ) -> impl Future<Output = anyhow::Result<Self::Environment>>;

    fn load_model(&self, url: &str) -> impl Future<Output = anyhow::Result<Self::Model>>;
}

#[derive(Debug, thiserror::Error)]
pub enum BootError {
    #[error("environment {url} failed to load: {reason:#}")]
    Environment {
        url: String,
        reason: anyhow::Error,
    },
    #[error("model {url} failed to load: {reason:#}")]
    Model {
        url: String,
        reason: anyhow::Error,
    },
}

/// Load the environment, then the model, handing each to `sink` as it arrives.
pub async fn populate<L, S>(loader: &L, sink: &mut S, assets: &AssetPaths) -> Result<(), BootError>
where
    L: AssetLoader,
    S: SceneSink<L::Environment, L::Model>,
{
    sink.enter(Stage::EnvironmentLoading);
    let environment = match loader.load_environment(&assets.environment).await {
        Ok(environment) => environment,
        Err(reason) => {
            let err = BootError::Environment {
                url: assets.environment.clone(),
                reason,
            };
            log::error!("{}", err);
            return Err(err);
        }
    };
    sink.install_environment(environment);

    sink.enter(Stage::ModelLoading);
    let result = match loader.load_model(&assets.model).await {
        Ok(model) => {
            sink.attach_model(model);
            Ok(())
        }
        Err(reason) => {
            let err = BootError::Model {
                url: assets.model.clone(),
                reason,
            };
            log::error!("{}", err);
            Err(err)
        }
    };
    sink.enter(Stage::Ready);
    result
}
