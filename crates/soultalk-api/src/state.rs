//! Application state wiring all services together.
//!
//! AppState holds the concrete service instances used by both CLI and REST API.
//! Services are generic over store and collaborator traits, but AppState
//! pins them to the concrete infra implementations.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;

use soultalk_core::chat::reply::ReplyGenerator;
use soultalk_core::chat::service::ChatService;
use soultalk_core::chat::title::TitleDeriver;
use soultalk_core::chat::turn::TurnOrchestrator;
use soultalk_core::llm::box_provider::BoxLlmProvider;
use soultalk_infra::config::{load_global_config, resolve_data_dir};
use soultalk_infra::llm::create_provider;
use soultalk_infra::llm::openai_compat::config::api_key_from_env;
use soultalk_infra::perception::http::{
    HttpAudioEmotionClassifier, HttpTextEmotionClassifier, HttpTranscriber, perception_client,
};
use soultalk_infra::sqlite::message::SqliteMessageRepository;
use soultalk_infra::sqlite::pool::{DatabasePool, database_url_in};
use soultalk_infra::sqlite::session::SqliteSessionRepository;
use soultalk_infra::storage::audio::LocalAudioStore;
use soultalk_types::config::GlobalConfig;

/// Concrete type aliases for the service generics pinned to infra implementations.
pub type ConcreteChatService = ChatService<SqliteSessionRepository, SqliteMessageRepository>;

pub type ConcreteTurnOrchestrator = TurnOrchestrator<
    SqliteSessionRepository,
    SqliteMessageRepository,
    HttpTextEmotionClassifier,
    HttpAudioEmotionClassifier,
    HttpTranscriber,
    LocalAudioStore,
>;

/// Shared application state holding all services.
///
/// Used by both CLI commands and REST API handlers.
#[derive(Clone)]
pub struct AppState {
    pub chat_service: Arc<ConcreteChatService>,
    pub turns: Arc<ConcreteTurnOrchestrator>,
    /// Directory served under `/uploads/audio`.
    pub audio_dir: PathBuf,
}

impl AppState {
    /// Initialize the application state: read config, connect to DB, wire services.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        tokio::fs::create_dir_all(&data_dir).await?;

        let config = load_global_config(&data_dir).await;
        let db_pool = DatabasePool::new(&database_url_in(&data_dir)).await?;

        let provider = create_provider(&config.llm, api_key_from_env()).context(
            "no LLM API key found; set SOULTALK_LLM_API_KEY (or COHERE_API_KEY / OPENAI_API_KEY)",
        )?;
        tracing::info!(provider = provider.name(), model = %config.llm.model, "LLM provider ready");

        let audio_dir = LocalAudioStore::audio_dir(&data_dir);
        tokio::fs::create_dir_all(&audio_dir).await?;

        Self::from_parts(db_pool, provider, &config, audio_dir)
    }

    /// Wire services from already-built infrastructure.
    pub fn from_parts(
        db_pool: DatabasePool,
        provider: BoxLlmProvider,
        config: &GlobalConfig,
        audio_dir: PathBuf,
    ) -> anyhow::Result<Self> {
        let sessions = Arc::new(SqliteSessionRepository::new(db_pool.clone()));
        let history = Arc::new(SqliteMessageRepository::new(db_pool.clone()));

        let provider = Arc::new(provider);
        let titles = TitleDeriver::new(provider.clone(), config.llm.model.as_str())
            .with_temperature(config.llm.title_temperature)
            .with_max_tokens(config.llm.title_max_tokens)
            .with_timeout(Duration::from_secs(config.llm.title_timeout_secs));
        let replies = ReplyGenerator::new(provider, config.llm.model.as_str())
            .with_temperature(config.llm.reply_temperature)
            .with_max_tokens(config.llm.reply_max_tokens);

        // One HTTP client shared by the three perception services
        let perception = &config.perception;
        let client = perception_client(perception.timeout_secs)?;

        let turns = TurnOrchestrator::new(
            sessions.clone(),
            history.clone(),
            HttpTextEmotionClassifier::new(client.clone(), perception.text_emotion_url.as_str()),
            HttpAudioEmotionClassifier::new(client.clone(), perception.audio_emotion_url.as_str()),
            HttpTranscriber::new(client, perception.transcribe_url.as_str()),
            LocalAudioStore::new(audio_dir.clone()),
            titles,
            replies,
        );

        Ok(Self {
            chat_service: Arc::new(ChatService::new(sessions, history)),
            turns: Arc::new(turns),
            audio_dir,
        })
    }
}

/// Open only the session store, for CLI commands that never call the LLM
/// or the perception services.
pub async fn open_chat_service() -> anyhow::Result<ConcreteChatService> {
    let data_dir = resolve_data_dir();
    tokio::fs::create_dir_all(&data_dir).await?;

    let db_pool = DatabasePool::new(&database_url_in(&data_dir)).await?;
    Ok(ChatService::new(
        Arc::new(SqliteSessionRepository::new(db_pool.clone())),
        Arc::new(SqliteMessageRepository::new(db_pool)),
    ))
}
