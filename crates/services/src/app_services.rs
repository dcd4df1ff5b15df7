use std::sync::Arc;

use remote::{GradioClient, PredictClient, RemoteConfig};
use tracing::info;

use crate::audio::{AudioOutput, AudioSlot, PronunciationPlayer};
use crate::autoplay::{AutoPlaySettings, AutoPlayer};
use crate::error::AppServicesError;
use crate::file_selection::FileSelectionService;
use crate::learning::WordLearningService;

/// Assembles the app-facing services around one shared predict client.
///
/// The pronunciation player and the auto-player each own their own audio slot
/// over the same output.
#[derive(Clone)]
pub struct AppServices {
    client: Arc<dyn PredictClient>,
    files: Arc<FileSelectionService>,
    learning: Arc<WordLearningService>,
    pronunciation: Arc<PronunciationPlayer>,
    autoplay: Arc<AutoPlayer>,
}

impl AppServices {
    #[must_use]
    pub fn new(
        client: Arc<dyn PredictClient>,
        output: Arc<dyn AudioOutput>,
        settings: AutoPlaySettings,
    ) -> Self {
        let files = Arc::new(FileSelectionService::new(Arc::clone(&client)));
        let learning = Arc::new(WordLearningService::new(Arc::clone(&client)));
        let pronunciation = Arc::new(PronunciationPlayer::new(
            Arc::clone(&client),
            Arc::new(AudioSlot::new(Arc::clone(&output))),
        ));
        let autoplay = Arc::new(AutoPlayer::new(Arc::clone(&client), output, settings));

        Self {
            client,
            files,
            learning,
            pronunciation,
            autoplay,
        }
    }

    /// Build services backed by the Gradio HTTP adapter.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::Rpc` for an invalid base URL.
    pub fn gradio(
        config: &RemoteConfig,
        output: Arc<dyn AudioOutput>,
        settings: AutoPlaySettings,
    ) -> Result<Self, AppServicesError> {
        let client = Arc::new(GradioClient::new(config)?);
        Ok(Self::new(client, output, settings))
    }

    /// Connect the shared client.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::Rpc` when the backend cannot be reached.
    pub async fn connect(&self) -> Result<(), AppServicesError> {
        self.client.connect().await?;
        info!(base_url = self.client.base_url(), "services ready");
        Ok(())
    }

    /// Stop all playback and drop the connection.
    pub fn shutdown(&self) {
        self.autoplay.stop();
        self.pronunciation.stop();
        self.client.disconnect();
    }

    #[must_use]
    pub fn client(&self) -> Arc<dyn PredictClient> {
        Arc::clone(&self.client)
    }

    #[must_use]
    pub fn files(&self) -> Arc<FileSelectionService> {
        Arc::clone(&self.files)
    }

    #[must_use]
    pub fn learning(&self) -> Arc<WordLearningService> {
        Arc::clone(&self.learning)
    }

    #[must_use]
    pub fn pronunciation(&self) -> Arc<PronunciationPlayer> {
        Arc::clone(&self.pronunciation)
    }

    #[must_use]
    pub fn autoplay(&self) -> Arc<AutoPlayer> {
        Arc::clone(&self.autoplay)
    }
}
