//! Inference session - owns at most one loaded model instance

use std::path::Path;
use std::sync::Arc;

use super::engine::{InferenceEngine, LlmError, ModelHandle};

/// Default generation window passed to the engine on load
pub const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Wraps exactly one loaded model instance.
///
/// Loading a new model always releases the previous instance first, so two
/// model instances are never live at the same time.
pub struct InferenceSession {
    engine: Arc<dyn InferenceEngine>,
    handle: Option<Box<dyn ModelHandle>>,
}

impl InferenceSession {
    pub fn new(engine: Arc<dyn InferenceEngine>) -> Self {
        Self {
            engine,
            handle: None,
        }
    }

    /// Load a model from the local file at `path`.
    ///
    /// Any previously held instance is released before the new load is
    /// attempted; if the new load fails the session is left unloaded.
    pub async fn load(&mut self, path: &Path, max_tokens: u32) -> Result<(), LlmError> {
        self.release();

        let handle = self.engine.create(path, max_tokens).await?;
        self.handle = Some(handle);

        log::info!("Model loaded from {:?}", path);
        Ok(())
    }

    /// Produce a completion for the given prompt
    pub async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let handle = self.handle.as_ref().ok_or(LlmError::NotLoaded)?;
        handle.generate(prompt).await
    }

    /// Free the held instance; safe to call when nothing is loaded
    pub fn release(&mut self) {
        if self.handle.take().is_some() {
            log::info!("Model instance released");
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.handle.is_some()
    }
}

impl Drop for InferenceSession {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Engine that tracks how many instances are live at once
    struct CountingEngine {
        live: Arc<AtomicUsize>,
        max_live: Arc<AtomicUsize>,
    }

    struct CountingHandle {
        live: Arc<AtomicUsize>,
    }

    impl Drop for CountingHandle {
        fn drop(&mut self) {
            self.live.fetch_sub(1, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl ModelHandle for CountingHandle {
        async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
            Ok(format!("echo: {}", prompt))
        }
    }

    #[async_trait]
    impl InferenceEngine for CountingEngine {
        async fn create(
            &self,
            _path: &Path,
            _max_tokens: u32,
        ) -> Result<Box<dyn ModelHandle>, LlmError> {
            let live = self.live.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_live.fetch_max(live, Ordering::SeqCst);
            Ok(Box::new(CountingHandle {
                live: self.live.clone(),
            }))
        }
    }

    fn counting_session() -> (InferenceSession, Arc<AtomicUsize>, Arc<AtomicUsize>) {
        let live = Arc::new(AtomicUsize::new(0));
        let max_live = Arc::new(AtomicUsize::new(0));
        let engine = Arc::new(CountingEngine {
            live: live.clone(),
            max_live: max_live.clone(),
        });
        (InferenceSession::new(engine), live, max_live)
    }

    #[tokio::test]
    async fn test_load_twice_never_holds_two_instances() {
        let (mut session, live, max_live) = counting_session();

        session.load(&PathBuf::from("a.task"), DEFAULT_MAX_TOKENS).await.unwrap();
        session.load(&PathBuf::from("b.task"), DEFAULT_MAX_TOKENS).await.unwrap();

        assert_eq!(live.load(Ordering::SeqCst), 1);
        assert_eq!(max_live.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_generate_without_load_fails() {
        let (session, _, _) = counting_session();

        let err = session.generate("hello").await.unwrap_err();
        assert!(matches!(err, LlmError::NotLoaded));
    }

    #[tokio::test]
    async fn test_failed_reload_does_not_leak_old_instance() {
        /// Succeeds on the first create, fails on every later one
        struct FlakyEngine {
            live: Arc<AtomicUsize>,
            creates: AtomicUsize,
        }

        #[async_trait]
        impl InferenceEngine for FlakyEngine {
            async fn create(
                &self,
                path: &Path,
                _max_tokens: u32,
            ) -> Result<Box<dyn ModelHandle>, LlmError> {
                if self.creates.fetch_add(1, Ordering::SeqCst) > 0 {
                    return Err(LlmError::InvalidModelFile(format!("{:?} is not a model", path)));
                }
                self.live.fetch_add(1, Ordering::SeqCst);
                Ok(Box::new(CountingHandle {
                    live: self.live.clone(),
                }))
            }
        }

        let live = Arc::new(AtomicUsize::new(0));
        let engine = Arc::new(FlakyEngine {
            live: live.clone(),
            creates: AtomicUsize::new(0),
        });
        let mut session = InferenceSession::new(engine);

        session.load(&PathBuf::from("a.task"), DEFAULT_MAX_TOKENS).await.unwrap();
        assert_eq!(live.load(Ordering::SeqCst), 1);

        let err = session.load(&PathBuf::from("bad.task"), DEFAULT_MAX_TOKENS).await.unwrap_err();
        assert!(matches!(err, LlmError::InvalidModelFile(_)));

        // Old instance was released before the failing attempt
        assert_eq!(live.load(Ordering::SeqCst), 0);
        assert!(!session.is_loaded());
    }

    #[tokio::test]
    async fn test_release_is_idempotent() {
        let (mut session, live, _) = counting_session();

        session.load(&PathBuf::from("a.task"), DEFAULT_MAX_TOKENS).await.unwrap();
        session.release();
        session.release();

        assert_eq!(live.load(Ordering::SeqCst), 0);
    }
}
