use anyhow::Result;
use clap::ValueEnum;

use ccat::endpoints::settings::FactoryKind;
use ccat::CatClient;

use crate::render;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Factory {
    Llm,
    Embedder,
    AuthHandler,
}

impl From<Factory> for FactoryKind {
    fn from(factory: Factory) -> Self {
        match factory {
            Factory::Llm => FactoryKind::LargeLanguageModel,
            Factory::Embedder => FactoryKind::Embedder,
            Factory::AuthHandler => FactoryKind::AuthHandler,
        }
    }
}

pub async fn run(client: &CatClient, factory: Factory) -> Result<()> {
    let endpoint = match FactoryKind::from(factory) {
        FactoryKind::LargeLanguageModel => client.large_language_model(),
        FactoryKind::Embedder => client.embedder(),
        FactoryKind::AuthHandler => client.auth_handler(),
    };
    render::json(&endpoint.get_settings(None).await?)
}
