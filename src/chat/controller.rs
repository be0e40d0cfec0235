//! Chat controller
//!
//! Single authority over the live message sequence, the persona set, the
//! context policy, the model lifecycle state, and turn sequencing. The
//! presentation layer observes it through change events and never holds
//! business logic of its own.

use std::path::Path;
use std::sync::Arc;

use tokio::sync::{broadcast, Mutex, RwLock};

use crate::database::{Conversation, DatabaseManager, Message, MessageStatus};
use crate::llm_engine::{InferenceEngine, InferenceSession, DEFAULT_MAX_TOKENS};
use crate::model_manager::{
    DownloadProgress, DownloadableModel, ModelInfo, ModelProvisioner, DEFAULT_MODEL,
};
use crate::speech::{SpeechSink, TtsLanguage};

use super::context;
use super::export;
use super::personas::{default_personas, Persona};
use super::types::{ChatEvent, ModelState};

/// Mutable controller state, all behind one lock
struct ControllerState {
    messages: Vec<Message>,
    personas: Vec<Persona>,
    active_persona: Persona,
    next_persona_id: i64,
    include_history: bool,
    model_state: ModelState,
    model_info: Option<ModelInfo>,
    status: Option<String>,
    auto_speak: bool,
    tts_language: TtsLanguage,
    last_message_id: i64,
}

impl ControllerState {
    fn new() -> Self {
        let personas = default_personas();
        let active_persona = personas[0].clone();
        let next_persona_id = personas.iter().map(|p| p.id).max().unwrap_or(0) + 1;

        Self {
            messages: Vec::new(),
            personas,
            active_persona,
            next_persona_id,
            include_history: true,
            model_state: ModelState::Idle,
            model_info: None,
            status: None,
            auto_speak: false,
            tts_language: TtsLanguage::default(),
            last_message_id: 0,
        }
    }

    /// Millisecond-derived message id, bumped when the clock has not moved
    /// so ids stay strictly increasing within the live sequence
    fn next_message_id(&mut self) -> i64 {
        let now = chrono::Utc::now().timestamp_millis();
        let id = now.max(self.last_message_id + 1);
        self.last_message_id = id;
        id
    }
}

/// The chat-session and model-lifecycle controller
pub struct ChatController {
    state: RwLock<ControllerState>,
    /// The only route to the model; loads and generations serialize here
    session: Mutex<InferenceSession>,
    events: broadcast::Sender<ChatEvent>,
    speech: Option<Arc<dyn SpeechSink>>,
}

impl ChatController {
    pub fn new(engine: Arc<dyn InferenceEngine>) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            state: RwLock::new(ControllerState::new()),
            session: Mutex::new(InferenceSession::new(engine)),
            events,
            speech: None,
        }
    }

    pub fn with_speech_sink(engine: Arc<dyn InferenceEngine>, sink: Arc<dyn SpeechSink>) -> Self {
        let mut controller = Self::new(engine);
        controller.speech = Some(sink);
        controller
    }

    /// Subscribe to change notifications
    pub fn subscribe(&self) -> broadcast::Receiver<ChatEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: ChatEvent) {
        let _ = self.events.send(event);
    }

    // === Observable state snapshots ===

    pub async fn messages(&self) -> Vec<Message> {
        self.state.read().await.messages.clone()
    }

    pub async fn model_state(&self) -> ModelState {
        self.state.read().await.model_state
    }

    pub async fn model_info(&self) -> Option<ModelInfo> {
        self.state.read().await.model_info.clone()
    }

    pub async fn status(&self) -> Option<String> {
        self.state.read().await.status.clone()
    }

    pub async fn personas(&self) -> Vec<Persona> {
        self.state.read().await.personas.clone()
    }

    pub async fn active_persona(&self) -> Persona {
        self.state.read().await.active_persona.clone()
    }

    pub async fn include_history(&self) -> bool {
        self.state.read().await.include_history
    }

    pub async fn auto_speak(&self) -> bool {
        self.state.read().await.auto_speak
    }

    pub async fn tts_language(&self) -> TtsLanguage {
        self.state.read().await.tts_language
    }

    // === Settings ===

    /// Apply persisted settings; called once at startup
    pub async fn load_settings(&self, db: &DatabaseManager) {
        match db.load_all_settings() {
            Ok(settings) => {
                let mut st = self.state.write().await;
                st.auto_speak = settings.auto_speak_responses;
                if let Some(lang) = settings
                    .tts_language
                    .as_deref()
                    .and_then(TtsLanguage::from_code)
                {
                    st.tts_language = lang;
                }
            }
            Err(e) => log::warn!("Failed to load settings: {}", e),
        }
    }

    /// Flip the history-inclusion toggle; read fresh on every send
    pub async fn set_include_history(&self, include: bool) {
        self.state.write().await.include_history = include;
    }

    pub async fn set_auto_speak(&self, db: &DatabaseManager, enabled: bool) {
        self.state.write().await.auto_speak = enabled;
        if let Err(e) = db.set_bool_setting("auto_speak_responses", enabled) {
            log::warn!("Failed to persist auto_speak_responses: {}", e);
        }
    }

    pub async fn set_tts_language(&self, db: &DatabaseManager, language: TtsLanguage) {
        self.state.write().await.tts_language = language;
        if let Err(e) = db.set_setting("tts_language", language.code(), "string") {
            log::warn!("Failed to persist tts_language: {}", e);
        }
    }

    // === Personas ===

    /// Make the persona with the given id active
    pub async fn set_persona(&self, id: i64) -> bool {
        let mut st = self.state.write().await;
        let found = st.personas.iter().find(|p| p.id == id).cloned();
        match found {
            Some(persona) => {
                st.active_persona = persona;
                drop(st);
                self.emit(ChatEvent::PersonasChanged);
                true
            }
            None => false,
        }
    }

    /// Add a persona and make it active
    pub async fn add_persona(&self, name: &str, content: &str) -> Persona {
        let mut st = self.state.write().await;
        let id = st.next_persona_id;
        st.next_persona_id += 1;

        let persona = Persona::new(id, name, content);
        st.personas.push(persona.clone());
        st.active_persona = persona.clone();
        drop(st);

        self.emit(ChatEvent::PersonasChanged);
        persona
    }

    /// Remove a persona.
    ///
    /// Removing the active persona makes the first remaining persona active.
    /// Removing the last persona is rejected; the set may never become empty.
    pub async fn remove_persona(&self, id: i64) -> Result<(), String> {
        let mut st = self.state.write().await;

        if !st.personas.iter().any(|p| p.id == id) {
            return Err("Persona not found".to_string());
        }
        if st.personas.len() == 1 {
            return Err("At least one persona is required".to_string());
        }

        st.personas.retain(|p| p.id != id);
        if st.active_persona.id == id {
            st.active_persona = st.personas[0].clone();
        }
        drop(st);

        self.emit(ChatEvent::PersonasChanged);
        Ok(())
    }

    // === Live conversation ===

    /// Clear the live message sequence; persisted conversations are untouched
    pub async fn new_chat(&self) {
        self.state.write().await.messages.clear();
        self.emit(ChatEvent::MessagesChanged);
    }

    /// Replace the live message sequence with a saved conversation's messages
    ///
    /// The loaded messages become the live session; saving later creates a
    /// new record rather than aliasing this one.
    pub async fn load_conversation(&self, conversation: &Conversation) {
        let mut st = self.state.write().await;
        st.messages = conversation.messages.clone();
        st.last_message_id = st
            .messages
            .iter()
            .map(|m| m.id)
            .max()
            .unwrap_or(st.last_message_id);
        drop(st);

        self.emit(ChatEvent::MessagesChanged);
    }

    /// Run one user turn.
    ///
    /// A no-op when the text is blank or no model is loaded. Only one
    /// generation may be in flight: the Loaded -> Generating transition is
    /// claimed atomically, and the state always returns to Loaded afterwards
    /// whether generation succeeded or failed.
    pub async fn send_user_message(&self, text: &str) {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return;
        }

        // Claim the turn and stage both messages under one lock
        let (prompt, bot_id) = {
            let mut st = self.state.write().await;
            if st.model_state != ModelState::Loaded {
                return;
            }

            let user_id = st.next_message_id();
            st.messages.push(Message::user(user_id, trimmed));

            let bot_id = st.next_message_id();
            st.messages.push(Message::assistant_streaming(bot_id));

            st.model_state = ModelState::Generating;

            let prompt = context::build_prompt(
                &st.active_persona,
                &st.messages,
                st.include_history,
                trimmed,
            );
            (prompt, bot_id)
        };

        self.emit(ChatEvent::MessagesChanged);
        self.emit(ChatEvent::ModelStateChanged(ModelState::Generating));

        let result = {
            let session = self.session.lock().await;
            session.generate(&prompt).await
        };

        // Settle the placeholder and return to Loaded on every path
        let speak_request = {
            let mut st = self.state.write().await;

            let mut speak_request = None;
            match result {
                Ok(response) => {
                    if let Some(message) = st.messages.iter_mut().find(|m| m.id == bot_id) {
                        message.text = response.clone();
                        message.status = MessageStatus::Complete;
                    }
                    if st.auto_speak {
                        speak_request = Some((response, st.tts_language));
                    }
                }
                Err(e) => {
                    log::warn!("Generation failed: {}", e);
                    if let Some(message) = st.messages.iter_mut().find(|m| m.id == bot_id) {
                        message.status = MessageStatus::Failed;
                        message.error = Some(format!("Error: {}", e));
                    }
                }
            }

            st.model_state = ModelState::Loaded;
            speak_request
        };

        self.emit(ChatEvent::MessagesChanged);
        self.emit(ChatEvent::ModelStateChanged(ModelState::Loaded));

        // Outside the lock; the sink may be arbitrarily slow
        if let Some((response, language)) = speak_request {
            if let Some(sink) = &self.speech {
                sink.speak(&response, language);
            }
        }
    }

    // === Model lifecycle ===

    /// Load a model artifact, replacing any currently loaded one.
    ///
    /// Rejected while a load or generation is in flight; the in-flight
    /// session is never torn down underneath an active generation.
    pub async fn switch_model(
        &self,
        path: &Path,
        name: &str,
        size: &str,
    ) -> Result<(), String> {
        {
            let mut st = self.state.write().await;
            match st.model_state {
                ModelState::Loading => {
                    return Err("A model is already loading".to_string());
                }
                ModelState::Generating => {
                    return Err("Cannot switch models while a response is being generated".to_string());
                }
                _ => {}
            }
            st.model_state = ModelState::Loading;
        }
        self.emit(ChatEvent::ModelStateChanged(ModelState::Loading));

        let result = {
            let mut session = self.session.lock().await;
            session.load(path, DEFAULT_MAX_TOKENS).await
        };

        let outcome = {
            let mut st = self.state.write().await;
            match result {
                Ok(()) => {
                    st.model_info = Some(ModelInfo::new(name, path.to_path_buf(), size));
                    st.model_state = ModelState::Loaded;
                    st.status = None;
                    Ok(st.model_info.clone())
                }
                Err(e) => {
                    st.model_state = ModelState::Error;
                    st.status = Some(e.to_string());
                    Err(e.to_string())
                }
            }
        };

        match outcome {
            Ok(info) => {
                log::info!("Model '{}' active", name);
                self.emit(ChatEvent::ModelChanged(info));
                self.emit(ChatEvent::ModelStateChanged(ModelState::Loaded));
                self.emit(ChatEvent::StatusChanged(None));
                Ok(())
            }
            Err(message) => {
                log::warn!("Model load failed: {}", message);
                self.emit(ChatEvent::ModelStateChanged(ModelState::Error));
                self.emit(ChatEvent::StatusChanged(Some(message.clone())));
                Err(message)
            }
        }
    }

    /// Startup model resolution: saved custom path, then the bundled
    /// default; if both fail the state settles at Error and the user must
    /// pick or download a model explicitly.
    pub async fn auto_load(&self, provisioner: &ModelProvisioner, db: &DatabaseManager) {
        let settings = db.load_all_settings().unwrap_or_else(|e| {
            log::warn!("Failed to read saved model settings: {}", e);
            Default::default()
        });

        if let Some(saved) = settings.saved_model_path.as_deref() {
            if let Some(path) = provisioner.resolve_from_saved_path(Path::new(saved)).await {
                let name = settings
                    .saved_model_name
                    .clone()
                    .unwrap_or_else(|| "Saved Model".to_string());
                if self.switch_model(&path, &name, "").await.is_ok() {
                    return;
                }
                log::warn!("Saved model failed to load, falling back to bundled default");
            }
        }

        match provisioner.resolve_bundled_default().await {
            Ok(path) => {
                let _ = self.switch_model(&path, DEFAULT_MODEL, "").await;
            }
            Err(e) => {
                self.set_error(e.to_string()).await;
            }
        }
    }

    /// Copy a user-picked file into place, load it, and remember the choice
    pub async fn load_user_model(
        &self,
        provisioner: &ModelProvisioner,
        db: &DatabaseManager,
        source: &Path,
    ) -> Result<(), String> {
        let path = provisioner
            .resolve_from_user_file(source)
            .await
            .map_err(|e| e.to_string())?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "Custom Model".to_string());

        self.switch_model(&path, &name, "").await?;
        self.persist_model_choice(db, &path, &name);
        Ok(())
    }

    /// Download a catalog model (idempotent), load it, and remember the choice
    pub async fn download_and_load_model<F>(
        &self,
        provisioner: &ModelProvisioner,
        db: &DatabaseManager,
        model: &DownloadableModel,
        on_progress: F,
    ) -> Result<(), String>
    where
        F: Fn(DownloadProgress) + Send + 'static,
    {
        let path = provisioner
            .resolve_from_download(model, on_progress)
            .await
            .map_err(|e| e.to_string())?;

        self.switch_model(&path, &model.name, &model.size).await?;
        self.persist_model_choice(db, &path, &model.name);
        Ok(())
    }

    fn persist_model_choice(&self, db: &DatabaseManager, path: &Path, name: &str) {
        if let Err(e) = db.set_setting("saved_model_path", &path.to_string_lossy(), "string") {
            log::warn!("Failed to persist saved_model_path: {}", e);
        }
        if let Err(e) = db.set_setting("saved_model_name", name, "string") {
            log::warn!("Failed to persist saved_model_name: {}", e);
        }
    }

    async fn set_error(&self, message: String) {
        {
            let mut st = self.state.write().await;
            st.model_state = ModelState::Error;
            st.status = Some(message.clone());
        }
        self.emit(ChatEvent::ModelStateChanged(ModelState::Error));
        self.emit(ChatEvent::StatusChanged(Some(message)));
    }

    /// Clear the observable status slot
    pub async fn dismiss_status(&self) {
        self.state.write().await.status = None;
        self.emit(ChatEvent::StatusChanged(None));
    }

    // === Saved conversations ===

    /// Save the live sequence as a new named conversation
    pub async fn save_conversation(
        &self,
        db: &DatabaseManager,
        name: &str,
    ) -> Result<String, String> {
        let name = name.trim();
        if name.is_empty() {
            return Err("A chat name is required".to_string());
        }

        let messages = self.messages().await;
        if messages.is_empty() {
            return Err("Nothing to save".to_string());
        }

        db.save_conversation(name, &messages)
            .map_err(|e| format!("Failed to save chat: {}", e))
    }

    /// List saved conversations, newest first
    pub async fn list_conversations(
        &self,
        db: &DatabaseManager,
    ) -> Result<Vec<Conversation>, String> {
        db.list_conversations()
            .map_err(|e| format!("Failed to load chats: {}", e))
    }

    /// Delete a saved conversation
    pub async fn delete_conversation(
        &self,
        db: &DatabaseManager,
        chat_id: &str,
    ) -> Result<(), String> {
        db.delete_conversation(chat_id)
            .map_err(|e| format!("Failed to delete chat: {}", e))
    }

    /// Render the live sequence as shareable text
    pub async fn export_transcript(&self) -> String {
        export::transcript(&self.messages().await)
    }

    /// Serialize the live sequence as shareable JSON
    pub async fn export_json(&self) -> Result<String, String> {
        export::to_json(&self.messages().await)
            .map_err(|e| format!("Failed to export chat: {}", e))
    }
}
